//! Request primitive behaviour against a mock server.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::Value;
use tootline::api::{Pagination, Params};
use tootline::context::Cancelled;
use tootline::error::RetryAfter;
use tootline::{Client, Config, Context, Error, ErrorKind};

fn client(server: &MockServer, token: &str) -> Client {
    Client::new(Config::new(server.base_url()).with_access_token(token)).unwrap()
}

#[tokio::test]
async fn bearer_header_when_token_set() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/instance")
            .header("authorization", "Bearer tok");
        then.status(200).json_body(serde_json::json!({"uri": "example.com"}));
    });

    let instance = client(&server, "tok")
        .get_instance(&Context::new())
        .await
        .unwrap();
    assert_eq!(instance.uri, "example.com");
    mock.assert();
}

#[tokio::test]
async fn no_authorization_header_without_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/instance")
            .header_missing("authorization");
        then.status(200).body("{}");
    });

    client(&server, "")
        .get_instance(&Context::new())
        .await
        .unwrap();
    mock.assert();
}

#[tokio::test]
async fn base_path_prefix_is_kept() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/social/api/v1/instance");
        then.status(200).body("{}");
    });

    let c = Client::new(Config::new(format!("{}/social/", server.base_url()))).unwrap();
    c.get_instance(&Context::new()).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn link_header_sets_cursor() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/timelines/home")
            .query_param("limit", "2");
        then.status(200)
            .header(
                "link",
                r#"<https://x/?max_id=891>; rel="next", <https://x/?since_id=900>; rel="prev""#,
            )
            .body("[]");
    });

    let mut pg = Pagination::with_limit(2);
    client(&server, "tok")
        .get_timeline_home(&Context::new(), Some(&mut pg))
        .await
        .unwrap();
    assert_eq!(pg.max_id.as_ref().map(|id| id.as_str()), Some("891"));
    assert_eq!(pg.since_id.as_ref().map(|id| id.as_str()), Some("900"));
    assert!(pg.min_id.is_none());
    assert_eq!(pg.limit, Some(2));
    mock.assert();
}

#[tokio::test]
async fn cursor_is_sent_as_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/timelines/home")
            .query_param("max_id", "891");
        then.status(200).body("[]");
    });

    let mut pg = Pagination {
        max_id: Some("891".into()),
        ..Pagination::default()
    };
    client(&server, "tok")
        .get_timeline_home(&Context::new(), Some(&mut pg))
        .await
        .unwrap();
    assert!(pg.is_last_page());
    mock.assert();
}

#[tokio::test]
async fn failed_call_leaves_cursor_alone() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/timelines/home");
        then.status(200)
            .header("link", r#"<https://x/?max_id=1>; rel="next""#)
            .body("not json");
    });

    let mut pg = Pagination {
        max_id: Some("50".into()),
        ..Pagination::default()
    };
    let err = client(&server, "tok")
        .get_timeline_home(&Context::new(), Some(&mut pg))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(pg.max_id.as_ref().map(|id| id.as_str()), Some("50"));
}

#[tokio::test]
async fn post_sends_form_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v1/custom")
            .header("content-type", "application/x-www-form-urlencoded")
            .body_includes("a=1")
            .body_includes("b%5B%5D=x");
        then.status(200).body(r#"{"ok":true}"#);
    });

    let params = Params::new().with("a", "1").with("b[]", "x");
    let v: Value = client(&server, "tok")
        .call(&Context::new(), reqwest::Method::POST, "/api/v1/custom", Some(&params), None)
        .await
        .unwrap();
    assert_eq!(v["ok"], true);
    mock.assert();
}

#[tokio::test]
async fn status_codes_are_classified() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/404");
        then.status(404).body(r#"{"error":"Record not found"}"#);
    });
    server.mock(|when, then| {
        when.path("/422");
        then.status(422).body(r#"{"error":"Validation failed: Text can't be blank"}"#);
    });
    server.mock(|when, then| {
        when.path("/400");
        then.status(400).body("<html>bad</html>");
    });
    server.mock(|when, then| {
        when.path("/400-with-message");
        then.status(400).body(r#"{"error":"Invalid limit"}"#);
    });
    server.mock(|when, then| {
        when.path("/300");
        then.status(300).body("");
    });
    server.mock(|when, then| {
        when.path("/401");
        then.status(401).body(r#"{"error":"The access token is invalid"}"#);
    });
    server.mock(|when, then| {
        when.path("/403");
        then.status(403).body("");
    });
    server.mock(|when, then| {
        when.path("/500");
        then.status(500).body("oops");
    });

    let c = client(&server, "tok");
    let ctx = Context::new();
    let call = |path: &'static str| {
        let c = c.clone();
        let ctx = ctx.clone();
        async move {
            c.call_discard(&ctx, reqwest::Method::GET, path, None, None)
                .await
                .unwrap_err()
        }
    };

    let err = call("/404").await;
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.api_error().unwrap().message, "Record not found");
    assert_eq!(err.to_string(), "Not found: 404 - Record not found");

    let err = call("/422").await;
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = call("/400").await;
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    let err = call("/400-with-message").await;
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert_eq!(err.api_error().unwrap().message, "Invalid limit");

    let err = call("/300").await;
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.api_error().unwrap().message, "400 Bad Request");

    assert_eq!(call("/401").await.kind(), ErrorKind::Unauthorized);
    assert_eq!(call("/403").await.kind(), ErrorKind::Forbidden);

    let err = call("/500").await;
    assert_eq!(err.kind(), ErrorKind::ServerError);
    assert_eq!(err.api_error().unwrap().message, "500 Internal Server Error");
}

#[tokio::test]
async fn rate_limit_surfaces_retry_after() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/instance");
        then.status(429)
            .header("retry-after", "30")
            .body(r#"{"error":"Too many requests"}"#);
    });

    let err = client(&server, "tok")
        .get_instance(&Context::new())
        .await
        .unwrap_err();
    let Error::RateLimited { retry_after, .. } = err else {
        panic!("expected rate limit, got {err:?}");
    };
    assert_eq!(retry_after, Some(RetryAfter::Delay(Duration::from_secs(30))));
}

#[tokio::test]
async fn cancellation_returns_the_cause() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/timelines/home");
        then.status(200)
            .delay(Duration::from_secs(5))
            .header("link", r#"<https://x/?max_id=1>; rel="next""#)
            .body(r#"[{"content":"late"}]"#);
    });

    let ctx = Context::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel_with_cause("user pressed escape");
    });

    let mut pg = Pagination::default();
    let err = client(&server, "tok")
        .get_timeline_home(&ctx, Some(&mut pg))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(
        err.cancellation(),
        Some(&Cancelled::Cause("user pressed escape".into()))
    );
    assert_eq!(pg, Pagination::default());
}

#[tokio::test]
async fn already_cancelled_context_sends_nothing() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path("/api/v1/instance");
        then.status(200).body("{}");
    });

    let ctx = Context::new();
    ctx.cancel();
    let err = client(&server, "tok").get_instance(&ctx).await.unwrap_err();
    assert_eq!(err.cancellation(), Some(&Cancelled::Canceled));
    mock.assert_calls(0);
}

#[tokio::test]
async fn deadline_exceeded() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/v1/instance");
        then.status(200).delay(Duration::from_secs(5)).body("{}");
    });

    let ctx = Context::new().with_timeout(Duration::from_millis(100));
    let err = client(&server, "tok").get_instance(&ctx).await.unwrap_err();
    assert_eq!(err.cancellation(), Some(&Cancelled::DeadlineExceeded));
}
