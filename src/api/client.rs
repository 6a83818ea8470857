//! Mastodon API HTTP client.
//!
//! [`Client::call`] is the single request primitive every endpoint goes through: it joins
//! the path onto the configured server, places parameters in the query or the form body,
//! attaches the bearer token, runs the exchange under a [`Context`], classifies non-2xx
//! responses and updates the caller's [`Pagination`] from the `Link` header.

use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::api::id::from_json;
use crate::api::pagination::Pagination;
use crate::config::Config;
use crate::context::Context;
use crate::error::{Error, Result, RetryAfter};

const USER_AGENT: &str = concat!("tootline/", env!("CARGO_PKG_VERSION"));

/// Ordered multimap of request parameters.
///
/// Repeated keys are kept in insertion order, which is how array parameters such as
/// `media_ids[]` are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// Add `key` only when `value` is present and non-empty.
    pub fn add_opt<V: AsRef<str>>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            let v = v.as_ref();
            if !v.is_empty() {
                self.add(key, v);
            }
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Body and `Link` header of a successful response.
struct Reply {
    body: Vec<u8>,
    link: Option<String>,
}

/// API client for a single Mastodon server.
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: Config) -> Result<Self> {
        config.server_url()?;
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { config, http })
    }

    /// Use a caller-supplied HTTP client (proxy, timeouts, TLS settings).
    pub fn with_http_client(config: Config, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token writes go through here; `&mut self` keeps them from racing in-flight calls.
    pub(crate) fn set_access_token(&mut self, token: String) {
        self.config.access_token = token;
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for `path`, keeping any path prefix of the configured server.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url> {
        let mut url = self.config.server_url()?;
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        Ok(url)
    }

    /// Attach `Authorization: Bearer <token>` when a token is configured.
    pub(crate) fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        if self.config.access_token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.config.access_token)
        }
    }

    /// Issue a request and decode the JSON response into `T`.
    ///
    /// GET and DELETE send `params` (and the non-empty fields of `pg`) as the query
    /// string; other methods send `params` as a form body. On success `pg` is replaced by
    /// the cursor from the response's `Link` header.
    pub async fn call<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        params: Option<&Params>,
        pg: Option<&mut Pagination>,
    ) -> Result<T> {
        let req = self.build(method, path, params, pg.as_deref())?;
        let reply = self.execute(ctx, req).await?;
        let value = from_json(&reply.body)?;
        if let Some(pg) = pg {
            pg.update_from_link(reply.link.as_deref());
        }
        Ok(value)
    }

    /// Like [`Client::call`] but discards the response body.
    pub async fn call_discard(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        params: Option<&Params>,
        pg: Option<&mut Pagination>,
    ) -> Result<()> {
        let req = self.build(method, path, params, pg.as_deref())?;
        let reply = self.execute(ctx, req).await?;
        if let Some(pg) = pg {
            pg.update_from_link(reply.link.as_deref());
        }
        Ok(())
    }

    /// POST a multipart form and decode the JSON response.
    pub(crate) async fn call_multipart<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let url = self.endpoint_url(path)?;
        debug!(method = "POST", %url, "multipart request");
        let req = self.authorize(self.http.post(url)).multipart(form);
        let reply = self.execute(ctx, req).await?;
        Ok(from_json(&reply.body)?)
    }

    fn build(
        &self,
        method: Method,
        path: &str,
        params: Option<&Params>,
        pg: Option<&Pagination>,
    ) -> Result<RequestBuilder> {
        let url = self.endpoint_url(path)?;
        debug!(%method, %url, "request");
        let in_query = method == Method::GET || method == Method::DELETE;
        let mut req = self.http.request(method, url);
        if in_query {
            let mut query = params.cloned().unwrap_or_default();
            if let Some(pg) = pg {
                pg.append_to(&mut query);
            }
            if !query.is_empty() {
                req = req.query(query.pairs());
            }
        } else if let Some(params) = params {
            req = req.form(params.pairs());
        }
        Ok(self.authorize(req))
    }

    /// Send, check the status and read the body, all under `ctx`.
    async fn execute(&self, ctx: &Context, req: RequestBuilder) -> Result<Reply> {
        ctx.run(async move {
            let response = req.send().await?;
            read_reply(response).await
        })
        .await?
    }
}

async fn read_reply(response: Response) -> Result<Reply> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(response).await);
    }
    let link = header_str(response.headers(), LINK.as_str());
    let body = response.bytes().await?.to_vec();
    Ok(Reply { body, link })
}

/// Classify a non-2xx response, reading an `{"error": "..."}` body when present.
pub(crate) async fn error_from_response(response: Response) -> Error {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let status = response.status();
    let retry_after =
        header_str(response.headers(), RETRY_AFTER.as_str()).and_then(|v| RetryAfter::parse(&v));
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            debug!(%status, error = %e, "could not read error body");
            Default::default()
        }
    };
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .map(|b| b.error);
    Error::from_status(status, message, retry_after)
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Percent-encode one path segment (tag names, account handles).
pub(crate) fn segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &str) -> Client {
        Client::new(Config::new(server)).unwrap()
    }

    #[test]
    fn client_builds_from_server_url() {
        assert!(Client::new(Config::new("https://example.com")).is_ok());
        assert!(matches!(
            Client::new(Config::new("example.com")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn endpoint_url_joins_without_double_slash() {
        let c = client("https://example.com/");
        assert_eq!(
            c.endpoint_url("/api/v1/timelines/home").unwrap().as_str(),
            "https://example.com/api/v1/timelines/home"
        );
    }

    #[test]
    fn endpoint_url_keeps_base_path_prefix() {
        let c = client("https://example.com/mastodon");
        assert_eq!(
            c.endpoint_url("/api/v1/statuses/1").unwrap().as_str(),
            "https://example.com/mastodon/api/v1/statuses/1"
        );
    }

    #[test]
    fn params_keep_order_and_repeats() {
        let mut p = Params::new();
        p.add("media_ids[]", "1").add("media_ids[]", "2").add("status", "hi");
        assert_eq!(
            p.pairs(),
            &[
                ("media_ids[]".to_string(), "1".to_string()),
                ("media_ids[]".to_string(), "2".to_string()),
                ("status".to_string(), "hi".to_string()),
            ]
        );
        assert_eq!(p.get("media_ids[]"), Some("1"));
    }

    #[test]
    fn add_opt_skips_empty_values() {
        let mut p = Params::new();
        p.add_opt("a", Some("")).add_opt("b", None::<&str>).add_opt("c", Some("x"));
        assert_eq!(p.pairs(), &[("c".to_string(), "x".to_string())]);
    }

    #[test]
    fn get_puts_pagination_in_query_but_post_does_not() {
        let c = client("https://example.com");
        let pg = Pagination {
            max_id: Some("10".into()),
            limit: Some(5),
            ..Pagination::default()
        };
        let params = Params::new().with("local", "true");

        let req = c
            .build(Method::GET, "/api/v1/timelines/public", Some(&params), Some(&pg))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.url().query(), Some("local=true&max_id=10&limit=5"));
        assert!(req.body().is_none());

        let req = c
            .build(Method::POST, "/api/v1/statuses", Some(&params), Some(&pg))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.url().query(), None);
        assert_eq!(
            req.body().and_then(|b| b.as_bytes()),
            Some(&b"local=true"[..])
        );
    }

    #[test]
    fn bearer_only_when_token_present() {
        let c = client("https://example.com");
        let req = c.build(Method::GET, "/x", None, None).unwrap().build().unwrap();
        assert!(req.headers().get("authorization").is_none());

        let c = Client::new(Config::new("https://example.com").with_access_token("tok")).unwrap();
        let req = c.build(Method::GET, "/x", None, None).unwrap().build().unwrap();
        assert_eq!(req.headers()["authorization"], "Bearer tok");
    }

    #[test]
    fn segment_escapes_reserved_characters() {
        assert_eq!(segment("rust lang"), "rust%20lang");
        assert_eq!(segment("a/b"), "a%2Fb");
    }
}
