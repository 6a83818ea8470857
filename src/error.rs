//! Library error type.
//!
//! Every REST endpoint surfaces exactly what the transport classified; streams wrap the
//! same values in [`crate::api::Event::Error`].

use std::fmt;
use std::time::{Duration, SystemTime};

use reqwest::StatusCode;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::context::Cancelled;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP/client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tungstenite::Error>),

    #[error("Request cancelled: {0}")]
    Cancelled(#[from] Cancelled),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// System keyring failure. Only the front-end touches the keyring.
    #[error("Credential store error: {0}")]
    Credential(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(ApiError),

    #[error("Forbidden: {0}")]
    Forbidden(ApiError),

    #[error("Not found: {0}")]
    NotFound(ApiError),

    #[error("Validation failed: {0}")]
    Validation(ApiError),

    #[error("Bad request: {0}")]
    BadRequest(ApiError),

    #[error("Rate limited: {error}")]
    RateLimited {
        error: ApiError,
        retry_after: Option<RetryAfter>,
    },

    #[error("Server error: {0}")]
    ServerError(ApiError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Network,
    Protocol,
    Io,
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    BadRequest,
    RateLimited,
    ServerError,
}

/// Status code and message of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.status.as_u16(), self.message)
    }
}

/// Parsed `Retry-After` header of a 429 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAfter {
    Delay(Duration),
    At(SystemTime),
}

impl RetryAfter {
    /// Accepts delta-seconds or an HTTP-date.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(secs) = value.parse::<u64>() {
            return Some(Self::Delay(Duration::from_secs(secs)));
        }
        httpdate::parse_http_date(value).ok().map(Self::At)
    }

    /// Time left to wait, measured from `now`.
    pub fn delay_from(&self, now: SystemTime) -> Duration {
        match self {
            Self::Delay(d) => *d,
            Self::At(at) => at.duration_since(now).unwrap_or_default(),
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Credential(_) => ErrorKind::Config,
            Self::Http(_) | Self::WebSocket(_) | Self::Cancelled(_) => ErrorKind::Network,
            Self::Protocol(_) | Self::Json(_) => ErrorKind::Protocol,
            Self::Io(_) => ErrorKind::Io,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::ServerError(_) => ErrorKind::ServerError,
        }
    }

    /// The cancellation cause, if this error came from a completed [`crate::Context`].
    pub fn cancellation(&self) -> Option<&Cancelled> {
        match self {
            Self::Cancelled(c) => Some(c),
            _ => None,
        }
    }

    /// Response status for errors built from a non-2xx response.
    pub fn status(&self) -> Option<StatusCode> {
        self.api_error().map(|e| e.status)
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Unauthorized(e)
            | Self::Forbidden(e)
            | Self::NotFound(e)
            | Self::Validation(e)
            | Self::BadRequest(e)
            | Self::ServerError(e)
            | Self::RateLimited { error: e, .. } => Some(e),
            _ => None,
        }
    }

    /// Classify a non-2xx response.
    ///
    /// `server_message` is the `error` field of the body when it was JSON.
    pub(crate) fn from_status(
        status: StatusCode,
        server_message: Option<String>,
        retry_after: Option<RetryAfter>,
    ) -> Self {
        let message = server_message.unwrap_or_else(|| status_line(status));
        let error = ApiError { status, message };
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(error),
            StatusCode::FORBIDDEN => Self::Forbidden(error),
            StatusCode::NOT_FOUND => Self::NotFound(error),
            StatusCode::UNPROCESSABLE_ENTITY => Self::Validation(error),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { error, retry_after },
            s if s.is_client_error() => Self::BadRequest(error),
            s if s.is_server_error() => Self::ServerError(error),
            _ => Self::Protocol(format!("unexpected response: {error}")),
        }
    }
}

impl From<tungstenite::Error> for Error {
    fn from(e: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(e))
    }
}

/// `404 Not Found` style status line.
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_status() {
        let cases = [
            (401, ErrorKind::Unauthorized),
            (403, ErrorKind::Forbidden),
            (404, ErrorKind::NotFound),
            (429, ErrorKind::RateLimited),
            (400, ErrorKind::BadRequest),
            (500, ErrorKind::ServerError),
            (503, ErrorKind::ServerError),
        ];
        for (code, kind) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(Error::from_status(status, None, None).kind(), kind, "{code}");
        }
    }

    #[test]
    fn only_unprocessable_entity_is_validation() {
        let err = Error::from_status(
            StatusCode::BAD_REQUEST,
            Some("Scopes are invalid".into()),
            None,
        );
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.api_error().unwrap().message, "Scopes are invalid");

        let err = Error::from_status(StatusCode::UNPROCESSABLE_ENTITY, None, None);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn non_error_status_is_a_protocol_error() {
        for code in [300, 304, 101] {
            let status = StatusCode::from_u16(code).unwrap();
            let err = Error::from_status(status, None, None);
            assert_eq!(err.kind(), ErrorKind::Protocol, "{code}");
        }
    }

    #[test]
    fn validation_keeps_server_message() {
        let err = Error::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            Some("Validation failed: Text can't be blank".into()),
            None,
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.api_error().unwrap().message,
            "Validation failed: Text can't be blank"
        );
    }

    #[test]
    fn missing_server_message_falls_back_to_status_line() {
        let err = Error::from_status(StatusCode::NOT_FOUND, None, None);
        assert_eq!(err.api_error().unwrap().message, "404 Not Found");
    }

    #[test]
    fn retry_after_accepts_seconds_and_dates() {
        assert_eq!(
            RetryAfter::parse("120"),
            Some(RetryAfter::Delay(Duration::from_secs(120)))
        );
        let at = RetryAfter::parse("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        let RetryAfter::At(when) = at else {
            panic!("expected a date, got {at:?}");
        };
        assert_eq!(
            when.duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs(),
            784_111_777
        );
        assert_eq!(at.delay_from(SystemTime::now()), Duration::ZERO);
        assert_eq!(RetryAfter::parse("soon"), None);
    }
}
