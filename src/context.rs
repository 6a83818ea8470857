//! Request-scoped cancellation.
//!
//! A [`Context`] is cancelled explicitly, with an optional cause, or by a deadline. Child
//! contexts are cancelled with their parent and report the parent's cause.

use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a [`Context`] completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Cancelled {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
    #[error("{0}")]
    Cause(String),
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    deadline: Option<Instant>,
    cause: OnceLock<Cancelled>,
    parent: Option<Arc<Inner>>,
}

impl Inner {
    fn cause(&self) -> Option<Cancelled> {
        if let Some(c) = self.cause.get() {
            return Some(c.clone());
        }
        self.parent.as_ref().and_then(|p| p.cause())
    }

    fn finish(&self, cause: Cancelled) {
        let _ = self.cause.set(cause);
        self.token.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// A context that is never done until cancelled.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                deadline: None,
                cause: OnceLock::new(),
                parent: None,
            }),
        }
    }

    /// A child that completes with this context or when it is cancelled itself.
    pub fn child(&self) -> Self {
        self.derive(self.inner.deadline)
    }

    /// A child that also completes after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let deadline = match self.inner.deadline {
            Some(d) if d < deadline => d,
            _ => deadline,
        };
        self.derive(Some(deadline))
    }

    fn derive(&self, deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: self.inner.token.child_token(),
                deadline,
                cause: OnceLock::new(),
                parent: Some(Arc::clone(&self.inner)),
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.finish(Cancelled::Canceled);
    }

    pub fn cancel_with_cause(&self, cause: impl Into<String>) {
        self.inner.finish(Cancelled::Cause(cause.into()));
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// `Some(cause)` once the context has completed.
    pub fn err(&self) -> Option<Cancelled> {
        if self.inner.token.is_cancelled() {
            return Some(self.inner.cause().unwrap_or(Cancelled::Canceled));
        }
        match self.inner.deadline {
            Some(d) if Instant::now() >= d => {
                self.inner.finish(Cancelled::DeadlineExceeded);
                self.inner.cause()
            }
            _ => None,
        }
    }

    /// Resolves when the context completes.
    pub async fn done(&self) -> Cancelled {
        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.inner.token.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {
                        self.inner.finish(Cancelled::DeadlineExceeded);
                    }
                }
            }
            None => self.inner.token.cancelled().await,
        }
        self.inner.cause().unwrap_or(Cancelled::Canceled)
    }

    /// Drive `fut` until it finishes or the context completes, whichever is first.
    ///
    /// When the context wins, `fut` is dropped without being polled again.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        if let Some(cause) = self.err() {
            return Err(cause);
        }
        tokio::select! {
            biased;
            cause = self.done() => Err(cause),
            out = fut => Ok(out),
        }
    }

    /// Sleep that ends early when the context completes.
    pub async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        self.run(tokio::time::sleep(duration)).await
    }
}
