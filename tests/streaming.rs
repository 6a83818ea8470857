//! SSE and WebSocket streams against local servers.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use httpmock::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tootline::api::streaming::RECONNECT_DELAY;
use tootline::api::Event;
use tootline::{Client, Config, Context, ErrorKind};

const WAIT: Duration = Duration::from_secs(10);

fn client(base: &str) -> Client {
    Client::new(Config::new(base).with_access_token("tok")).unwrap()
}

async fn next(rx: &mut mpsc::Receiver<Event>) -> Event {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("stream ended")
}

fn content(event: Event) -> String {
    match event {
        Event::Update(s) => s.content,
        other => panic!("expected an update, got {other:?}"),
    }
}

#[tokio::test]
async fn sse_updates_then_cancel_closes_channel() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/streaming/public/local")
            .header("accept", "text/event-stream")
            .header("authorization", "Bearer tok");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(
                "\nevent: update\ndata: {\"content\":\"foo\"}\n\nevent: update\ndata: {\"content\":\"bar\"}\n\n",
            );
    });

    let ctx = Context::new();
    let mut rx = client(&server.base_url())
        .streaming_public(&ctx, true)
        .await
        .unwrap();
    assert_eq!(content(next(&mut rx).await), "foo");
    assert_eq!(content(next(&mut rx).await), "bar");

    ctx.cancel();
    let end = timeout(WAIT, rx.recv()).await.expect("channel stayed open");
    assert!(end.is_none());
}

#[tokio::test]
async fn sse_hashtag_selector_and_delete() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/streaming/hashtag")
            .query_param("tag", "rust");
        then.status(200)
            .body(":thump\nevent: delete\ndata: 1234567\n\n");
    });

    let ctx = Context::new();
    let mut rx = client(&server.base_url())
        .streaming_hashtag(&ctx, "#rust", false)
        .await
        .unwrap();
    match next(&mut rx).await {
        Event::Delete(id) => assert_eq!(id, "1234567"),
        other => panic!("expected delete, got {other:?}"),
    }
    ctx.cancel();
    mock.assert_calls(1);
}

#[tokio::test]
async fn sse_reconnects_once_after_delay() {
    let server = MockServer::start();
    let mut first = server.mock(|when, then| {
        when.method(GET).path("/api/v1/streaming/user");
        then.status(200)
            .body("event: update\ndata: {\"content\":\"foo\"}\n\n");
    });

    let ctx = Context::new();
    let started = Instant::now();
    let mut rx = client(&server.base_url())
        .streaming_user(&ctx)
        .await
        .unwrap();
    assert_eq!(content(next(&mut rx).await), "foo");
    first.assert_calls(1);

    first.delete();
    let second = server.mock(|when, then| {
        when.method(GET).path("/api/v1/streaming/user");
        then.status(200)
            .body("event: update\ndata: {\"content\":\"bar\"}\n\n");
    });
    assert_eq!(content(next(&mut rx).await), "bar");
    assert!(started.elapsed() >= RECONNECT_DELAY, "{:?}", started.elapsed());
    second.assert_calls(1);
    ctx.cancel();
}

#[tokio::test]
async fn streams_need_an_access_token() {
    let server = MockServer::start();
    let sse = server.mock(|when, then| {
        when.path("/api/v1/streaming/user");
        then.status(200).body("");
    });

    let anonymous = Client::new(Config::new(server.base_url())).unwrap();
    let ctx = Context::new();
    let err = anonymous.streaming_user(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    let err = anonymous.streaming_ws_user(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    sse.assert_calls(0);
}

#[tokio::test]
async fn sse_dial_failure_is_reported() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/v1/streaming/direct");
        then.status(500).body("down");
    });

    let ctx = Context::new();
    let mut rx = client(&server.base_url())
        .streaming_direct(&ctx)
        .await
        .unwrap();
    match next(&mut rx).await {
        Event::Error(e) => assert_eq!(e.kind(), ErrorKind::ServerError),
        other => panic!("expected an error, got {other:?}"),
    }
    ctx.cancel();
}

#[tokio::test]
async fn sse_bad_payload_does_not_end_the_stream() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/v1/streaming/list").query_param("list", "7");
        then.status(200).body(
            "event: update\ndata: <html>\n\nevent: notification\ndata: {\"id\":\"1\",\"type\":\"follow\"}\n\n",
        );
    });

    let ctx = Context::new();
    let mut rx = client(&server.base_url())
        .streaming_list(&ctx, &"7".into())
        .await
        .unwrap();
    assert!(matches!(next(&mut rx).await, Event::Error(e) if e.kind() == ErrorKind::Protocol));
    assert!(matches!(next(&mut rx).await, Event::Notification(n) if n.id == "1"));
    ctx.cancel();
}

/// Accept one WebSocket client, report its request URI, send `frames`, then hold the
/// connection open until the client leaves.
async fn ws_server(frames: Vec<&'static str>) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (uri_tx, uri_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let _ = uri_tx.send(req.uri().to_string());
            Ok(resp)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .unwrap();
        for frame in frames {
            ws.send(Message::text(frame)).await.unwrap();
        }
        while let Some(Ok(_)) = ws.next().await {}
    });
    (addr, uri_rx)
}

#[tokio::test]
async fn ws_frames_in_order() {
    let (addr, uri) = ws_server(vec![
        r#"{"event":"update","payload":"{\"content\":\"foo\"}"}"#,
        r#"{"event":"notification","payload":"{\"id\":123}"}"#,
        r#"{"event":"delete","payload":1234567}"#,
        r#"{"event":"update","payload":"<html>"}"#,
    ])
    .await;

    let ctx = Context::new();
    let mut rx = client(&format!("http://{addr}"))
        .streaming_ws_user(&ctx)
        .await
        .unwrap();

    assert_eq!(content(next(&mut rx).await), "foo");
    assert!(matches!(next(&mut rx).await, Event::Notification(n) if n.id == "123"));
    assert!(matches!(next(&mut rx).await, Event::Delete(id) if id == "1234567"));
    assert!(matches!(next(&mut rx).await, Event::Error(e) if e.kind() == ErrorKind::Protocol));

    let uri = uri.await.unwrap();
    assert!(uri.starts_with("/api/v1/streaming?"), "{uri}");
    assert!(uri.contains("access_token=tok"), "{uri}");
    assert!(uri.contains("stream=user"), "{uri}");
    ctx.cancel();
}

#[tokio::test]
async fn ws_hashtag_selector() {
    let (addr, uri) = ws_server(vec![]).await;
    let ctx = Context::new();
    let _rx = client(&format!("http://{addr}"))
        .streaming_ws_hashtag(&ctx, "rust", true)
        .await
        .unwrap();

    let uri = timeout(WAIT, uri).await.unwrap().unwrap();
    assert!(uri.contains("stream=hashtag%3Alocal"), "{uri}");
    assert!(uri.contains("tag=rust"), "{uri}");
    ctx.cancel();
}

/// Answer every handshake with a redirect to `location`.
async fn redirect_server(location: impl Fn(SocketAddr) -> String + Send + 'static) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            redirect(stream, &location(addr)).await;
        }
    });
    addr
}

async fn redirect(mut stream: TcpStream, location: &str) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let response = format!(
        "HTTP/1.1 301 Moved Permanently\r\nLocation: {location}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

#[tokio::test]
async fn ws_follows_redirects() {
    let (target, uri) =
        ws_server(vec![r#"{"event":"update","payload":"{\"content\":\"moved\"}"}"#]).await;
    let front = redirect_server(move |_| {
        format!("http://{target}/api/v1/streaming?stream=user&access_token=tok")
    })
    .await;

    let ctx = Context::new();
    let mut rx = client(&format!("http://{front}"))
        .streaming_ws_user(&ctx)
        .await
        .unwrap();
    assert_eq!(content(next(&mut rx).await), "moved");
    assert!(uri.await.unwrap().contains("stream=user"));
    ctx.cancel();
}

#[tokio::test]
async fn ws_redirect_loop_gives_up() {
    let addr = redirect_server(|_| "/api/v1/streaming?stream=user".to_string()).await;

    let ctx = Context::new();
    let mut rx = client(&format!("http://{addr}"))
        .streaming_ws_user(&ctx)
        .await
        .unwrap();
    match next(&mut rx).await {
        Event::Error(e) => {
            assert_eq!(e.kind(), ErrorKind::Protocol);
            assert!(e.to_string().contains("redirects"), "{e}");
        }
        other => panic!("expected an error, got {other:?}"),
    }
    ctx.cancel();
}
