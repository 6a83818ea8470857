//! WebSocket streaming.
//!
//! The token travels as the `access_token` query parameter since browsers cannot set
//! headers on an upgrade request. Every text frame is a `{event, payload}` envelope whose
//! payload is usually a JSON document encoded once more as a string.

use futures::StreamExt;
use reqwest::header::LOCATION;
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

use super::{backoff, decode_event, emit, Closed, Event, Timeline, CHANNEL_CAPACITY};
use crate::api::client::Client;
use crate::api::id::Id;
use crate::context::Context;
use crate::error::{Error, Result};

/// Redirects followed while dialing before giving up.
pub const MAX_REDIRECTS: usize = 8;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    payload: Value,
}

/// Decode one text frame. `None` for envelopes with an unknown event name.
pub(crate) fn parse_frame(text: &str) -> Option<Event> {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => return Some(Event::Error(Error::Protocol(format!("bad frame: {e}")))),
    };
    match envelope.payload {
        Value::String(s) => decode_event(&envelope.event, &s),
        other => decode_event(&envelope.event, &other.to_string()),
    }
}

/// Map an http(s) URL onto ws(s). Other schemes are left alone.
fn to_ws_scheme(url: &mut Url) -> Result<()> {
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return Ok(()),
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::Config(format!("cannot use {url} for a websocket")))
}

impl Client {
    pub async fn streaming_ws_public(&self, ctx: &Context, local: bool) -> Result<mpsc::Receiver<Event>> {
        self.streaming_ws(ctx, Timeline::Public { local }).await
    }

    pub async fn streaming_ws_user(&self, ctx: &Context) -> Result<mpsc::Receiver<Event>> {
        self.streaming_ws(ctx, Timeline::User).await
    }

    pub async fn streaming_ws_hashtag(
        &self,
        ctx: &Context,
        tag: &str,
        local: bool,
    ) -> Result<mpsc::Receiver<Event>> {
        let tag = tag.to_string();
        self.streaming_ws(ctx, Timeline::Hashtag { tag, local }).await
    }

    pub async fn streaming_ws_list(&self, ctx: &Context, list_id: &Id) -> Result<mpsc::Receiver<Event>> {
        self.streaming_ws(ctx, Timeline::List(list_id.clone())).await
    }

    pub async fn streaming_ws_direct(&self, ctx: &Context) -> Result<mpsc::Receiver<Event>> {
        self.streaming_ws(ctx, Timeline::Direct).await
    }

    async fn streaming_ws(&self, ctx: &Context, timeline: Timeline) -> Result<mpsc::Receiver<Event>> {
        let url = self.streaming_ws_url(&timeline)?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(run(ctx.clone(), url, tx));
        Ok(rx)
    }

    /// `ws(s)://<server>/api/v1/streaming?access_token=..&stream=..[&tag=..|&list=..]`
    pub(crate) fn streaming_ws_url(&self, timeline: &Timeline) -> Result<Url> {
        let token = self.config().require_access_token()?;
        let mut url = self.endpoint_url("/api/v1/streaming")?;
        to_ws_scheme(&mut url)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("access_token", token);
            query.append_pair("stream", timeline.name());
            for (k, v) in timeline.selector().pairs() {
                query.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

async fn run(ctx: Context, url: Url, tx: mpsc::Sender<Event>) {
    loop {
        match ctx.run(connect_once(&url, &tx)).await {
            Err(cause) => {
                debug!(%cause, "websocket stream stopped");
                return;
            }
            Ok(Ok(Closed::ByReceiver)) => return,
            Ok(Ok(Closed::ByServer)) => debug!("websocket closed by server"),
            Ok(Err(e)) => {
                warn!(error = %e, "websocket stream failed");
                if !emit(&ctx, &tx, Event::Error(e)).await {
                    return;
                }
            }
        }
        if !backoff(&ctx, &tx).await {
            return;
        }
        debug!("websocket reconnecting");
    }
}

async fn connect_once(url: &Url, tx: &mpsc::Sender<Event>) -> Result<Closed> {
    let mut socket = dial(url).await?;
    while let Some(msg) = socket.next().await {
        let msg = msg?;
        let event = match msg {
            Message::Text(_) => parse_frame(msg.to_text()?),
            Message::Close(_) => break,
            _ => None,
        };
        if let Some(event) = event {
            if tx.send(event).await.is_err() {
                let _ = socket.close(None).await;
                return Ok(Closed::ByReceiver);
            }
        }
    }
    Ok(Closed::ByServer)
}

/// Connect, following handshake responses that carry a `Location` header.
async fn dial(url: &Url) -> Result<Socket> {
    let mut target = url.clone();
    for _ in 0..=MAX_REDIRECTS {
        match connect_async(target.as_str()).await {
            Ok((socket, _)) => return Ok(socket),
            Err(tungstenite::Error::Http(response)) => {
                let Some(location) = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                else {
                    return Err(Error::from(tungstenite::Error::Http(response)));
                };
                let mut next = target.join(location).map_err(|e| {
                    Error::Protocol(format!("bad redirect location {location:?}: {e}"))
                })?;
                to_ws_scheme(&mut next)?;
                debug!(from = %redacted(&target), to = %redacted(&next), "websocket redirect");
                target = next;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(Error::Protocol(format!(
        "websocket dial exceeded {MAX_REDIRECTS} redirects"
    )))
}

/// URL without its query, which holds the token.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
