//! tootline: Mastodon client library and terminal front-end.
//!
//! The library half is [`api`]: a [`Client`] bound to one server, typed endpoint methods,
//! the OAuth flow, and SSE/WebSocket event streams. Every network call takes a
//! [`Context`] for cancellation. The remaining modules make up the TUI.

#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::too_long_first_doc_paragraph
)]

pub mod api;
pub mod app;
pub mod config;
pub mod context;
pub mod credential;
pub mod error;
pub mod tui;

pub use api::Client;
pub use config::Config;
pub use context::Context;
pub use error::{Error, ErrorKind, Result};
