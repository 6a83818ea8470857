//! Real-time event streams.
//!
//! Both transports ([`sse`] and [`ws`]) hand back the receiving half of a bounded channel
//! of [`Event`]s fed by one spawned worker. The worker reconnects three seconds after a
//! failure or a clean close and exits, dropping its sender, when the [`Context`] completes
//! or the receiver is dropped.

pub mod sse;
pub mod ws;

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::api::client::Params;
use crate::api::id::{from_json, Id};
use crate::api::types::{Notification, Status};
use crate::context::Context;
use crate::error::{Error, Result};

/// Buffered events per stream; the worker waits when the consumer falls behind.
pub const CHANNEL_CAPACITY: usize = 10;

pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// One item delivered by a stream.
#[derive(Debug)]
pub enum Event {
    /// A new status on the timeline.
    Update(Box<Status>),
    /// A status that was edited.
    StatusUpdate(Box<Status>),
    Notification(Box<Notification>),
    /// Id of a deleted status.
    Delete(Id),
    /// A payload that failed to decode, or a connection failure before a reconnect.
    Error(Error),
}

/// Which timeline a stream follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Timeline {
    Public { local: bool },
    User,
    Hashtag { tag: String, local: bool },
    List(Id),
    Direct,
}

impl Timeline {
    /// Stream name as used by the WebSocket `stream` parameter.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Public { local: false } => "public",
            Self::Public { local: true } => "public:local",
            Self::User => "user",
            Self::Hashtag { local: false, .. } => "hashtag",
            Self::Hashtag { local: true, .. } => "hashtag:local",
            Self::List(_) => "list",
            Self::Direct => "direct",
        }
    }

    /// SSE endpoint path: the stream name with `:` turned into a path separator.
    pub(crate) fn sse_path(&self) -> String {
        format!("/api/v1/streaming/{}", self.name().replace(':', "/"))
    }

    /// `tag` or `list` selector, when the stream has one.
    pub(crate) fn selector(&self) -> Params {
        let mut params = Params::new();
        match self {
            Self::Hashtag { tag, .. } => {
                params.add("tag", tag.trim_start_matches('#'));
            }
            Self::List(id) => {
                params.add("list", id.as_str());
            }
            _ => {}
        }
        params
    }
}

fn decode<T: DeserializeOwned>(name: &str, data: &str) -> Result<Box<T>> {
    from_json(data.as_bytes())
        .map(Box::new)
        .map_err(|e| Error::Protocol(format!("bad {name} payload: {e}")))
}

/// Turn one named payload into an event. Unknown names yield `None`.
pub(crate) fn decode_event(name: &str, data: &str) -> Option<Event> {
    let event = match name {
        "update" => decode(name, data).map(Event::Update),
        "status.update" => decode(name, data).map(Event::StatusUpdate),
        "notification" => decode(name, data).map(Event::Notification),
        "delete" => {
            let id = data.trim().trim_matches('"');
            if id.is_empty() {
                Err(Error::Protocol("empty delete payload".into()))
            } else {
                Ok(Event::Delete(Id::new(id)))
            }
        }
        _ => return None,
    };
    Some(event.unwrap_or_else(Event::Error))
}

/// Deliver `event` unless the context completes first. `false` means the worker should stop.
pub(crate) async fn emit(ctx: &Context, tx: &mpsc::Sender<Event>, event: Event) -> bool {
    matches!(ctx.run(tx.send(event)).await, Ok(Ok(())))
}

/// Wait out the reconnect delay. `false` if the context completed or the receiver went away.
pub(crate) async fn backoff(ctx: &Context, tx: &mpsc::Sender<Event>) -> bool {
    tokio::select! {
        res = ctx.sleep(RECONNECT_DELAY) => res.is_ok(),
        () = tx.closed() => false,
    }
}

/// How one connection ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Closed {
    /// Server ended the stream; reconnect.
    ByServer,
    /// Nobody is listening any more.
    ByReceiver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_names_and_paths() {
        let cases = [
            (Timeline::Public { local: false }, "public", "/api/v1/streaming/public"),
            (Timeline::Public { local: true }, "public:local", "/api/v1/streaming/public/local"),
            (Timeline::User, "user", "/api/v1/streaming/user"),
            (
                Timeline::Hashtag { tag: "rust".into(), local: true },
                "hashtag:local",
                "/api/v1/streaming/hashtag/local",
            ),
            (Timeline::List(Id::from("7")), "list", "/api/v1/streaming/list"),
            (Timeline::Direct, "direct", "/api/v1/streaming/direct"),
        ];
        for (timeline, name, path) in cases {
            assert_eq!(timeline.name(), name);
            assert_eq!(timeline.sse_path(), path);
        }
    }

    #[test]
    fn selectors() {
        let tag = Timeline::Hashtag { tag: "#rust".into(), local: false };
        assert_eq!(tag.selector().get("tag"), Some("rust"));
        assert_eq!(Timeline::List(Id::from("7")).selector().get("list"), Some("7"));
        assert!(Timeline::User.selector().is_empty());
    }

    #[test]
    fn decodes_known_events() {
        let Some(Event::Update(status)) = decode_event("update", r#"{"content":"foo"}"#) else {
            panic!("expected update");
        };
        assert_eq!(status.content, "foo");

        let Some(Event::StatusUpdate(status)) = decode_event("status.update", r#"{"id":"5"}"#)
        else {
            panic!("expected status.update");
        };
        assert_eq!(status.id, "5");

        let Some(Event::Notification(n)) = decode_event("notification", r#"{"id":123}"#) else {
            panic!("expected notification");
        };
        assert_eq!(n.id, "123");
    }

    #[test]
    fn delete_payload_is_a_bare_or_quoted_id() {
        for data in ["1234567", " 1234567\n", "\"1234567\""] {
            let Some(Event::Delete(id)) = decode_event("delete", data) else {
                panic!("expected delete for {data:?}");
            };
            assert_eq!(id, "1234567");
        }
    }

    #[test]
    fn bad_payload_is_an_error_event_and_unknown_names_are_dropped() {
        let Some(Event::Error(err)) = decode_event("update", "<html>") else {
            panic!("expected error");
        };
        assert!(matches!(err, Error::Protocol(_)));
        assert!(decode_event("filters_changed", "").is_none());
    }

    #[tokio::test]
    async fn emit_stops_after_receiver_drops() {
        let ctx = Context::new();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert!(!emit(&ctx, &tx, Event::Delete(Id::from("1"))).await);
    }

    #[tokio::test]
    async fn backoff_ends_early_on_cancel() {
        let ctx = Context::new();
        let (tx, _rx) = mpsc::channel(1);
        ctx.cancel();
        assert!(!backoff(&ctx, &tx).await);
    }
}
