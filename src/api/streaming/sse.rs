//! Server-sent events over a long-lived HTTP GET.

use std::io;
use std::pin::pin;

use futures::{StreamExt, TryStreamExt};
use reqwest::header::ACCEPT;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};
use url::Url;

use super::{backoff, decode_event, emit, Closed, Event, Timeline, CHANNEL_CAPACITY};
use crate::api::client::{error_from_response, Client, Params};
use crate::api::id::Id;
use crate::context::Context;
use crate::error::{Error, Result};

const MAX_LINE: usize = 4 * 1024 * 1024;

/// Line parser remembering the most recent `event:` name.
#[derive(Debug, Default)]
pub(crate) struct SseParser {
    event: String,
}

impl SseParser {
    /// Feed one line (without its terminator).
    pub(crate) fn feed(&mut self, line: &str) -> Option<Event> {
        if line.starts_with(':') {
            return None;
        }
        if let Some(name) = field(line, "event") {
            self.event = name.trim().to_string();
            return None;
        }
        let data = field(line, "data")?;
        decode_event(&self.event, data)
    }
}

/// Value of `name: value`, with the single optional space after the colon removed.
fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn line_error(e: LinesCodecError) -> Error {
    match e {
        LinesCodecError::MaxLineLengthExceeded => {
            Error::Protocol(format!("event line longer than {MAX_LINE} bytes"))
        }
        LinesCodecError::Io(e) => {
            if e.get_ref().is_some_and(|inner| inner.is::<reqwest::Error>()) {
                if let Some(Ok(inner)) = e.into_inner().map(|i| i.downcast::<reqwest::Error>()) {
                    return Error::Http(*inner);
                }
                return Error::Protocol("stream body failed".into());
            }
            Error::Io(e)
        }
    }
}

impl Client {
    /// Federated (or local) public timeline.
    pub async fn streaming_public(&self, ctx: &Context, local: bool) -> Result<mpsc::Receiver<Event>> {
        self.streaming(ctx, Timeline::Public { local }).await
    }

    /// Home timeline and notifications of the authenticated user.
    pub async fn streaming_user(&self, ctx: &Context) -> Result<mpsc::Receiver<Event>> {
        self.streaming(ctx, Timeline::User).await
    }

    pub async fn streaming_hashtag(
        &self,
        ctx: &Context,
        tag: &str,
        local: bool,
    ) -> Result<mpsc::Receiver<Event>> {
        let tag = tag.to_string();
        self.streaming(ctx, Timeline::Hashtag { tag, local }).await
    }

    pub async fn streaming_list(&self, ctx: &Context, list_id: &Id) -> Result<mpsc::Receiver<Event>> {
        self.streaming(ctx, Timeline::List(list_id.clone())).await
    }

    pub async fn streaming_direct(&self, ctx: &Context) -> Result<mpsc::Receiver<Event>> {
        self.streaming(ctx, Timeline::Direct).await
    }

    async fn streaming(&self, ctx: &Context, timeline: Timeline) -> Result<mpsc::Receiver<Event>> {
        self.config().require_access_token()?;
        let url = self.endpoint_url(&timeline.sse_path())?;
        let params = timeline.selector();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(run(self.clone(), ctx.clone(), url, params, tx));
        Ok(rx)
    }
}

/// Worker loop: connect, forward events, back off, repeat.
async fn run(client: Client, ctx: Context, url: Url, params: Params, tx: mpsc::Sender<Event>) {
    loop {
        match ctx.run(connect_once(&client, &url, &params, &tx)).await {
            Err(cause) => {
                debug!(%url, %cause, "sse stream stopped");
                return;
            }
            Ok(Ok(Closed::ByReceiver)) => return,
            Ok(Ok(Closed::ByServer)) => debug!(%url, "sse stream closed by server"),
            Ok(Err(e)) => {
                warn!(%url, error = %e, "sse stream failed");
                if !emit(&ctx, &tx, Event::Error(e)).await {
                    return;
                }
            }
        }
        if !backoff(&ctx, &tx).await {
            return;
        }
        debug!(%url, "sse reconnecting");
    }
}

async fn connect_once(
    client: &Client,
    url: &Url,
    params: &Params,
    tx: &mpsc::Sender<Event>,
) -> Result<Closed> {
    let mut req = client
        .http()
        .get(url.clone())
        .header(ACCEPT, "text/event-stream");
    if !params.is_empty() {
        req = req.query(params.pairs());
    }
    let response = client.authorize(req).send().await?;
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body = response.bytes_stream().map_err(io::Error::other);
    let mut lines = pin!(FramedRead::new(
        StreamReader::new(body),
        LinesCodec::new_with_max_length(MAX_LINE),
    ));
    let mut parser = SseParser::default();
    while let Some(line) = lines.next().await {
        let line = line.map_err(line_error)?;
        if let Some(event) = parser.feed(&line) {
            if tx.send(event).await.is_err() {
                return Ok(Closed::ByReceiver);
            }
        }
    }
    Ok(Closed::ByServer)
}
