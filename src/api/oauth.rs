//! OAuth 2.0 app registration and token grants.
//!
//! Registration returns the client credentials; the three grants (password,
//! client credentials, authorization code) write the access token into the client's
//! [`Config`](crate::Config) and leave it untouched when they fail.

use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, Scope};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::{Client, Params};
use crate::api::id::Id;
use crate::context::Context;
use crate::error::{Error, Result};

/// Out-of-band redirect: the server shows the code instead of redirecting.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

pub const DEFAULT_SCOPES: &str = "read write follow";

/// Input to [`Client::register_app`]. Empty fields take the documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub client_name: String,
    /// Defaults to [`OOB_REDIRECT_URI`].
    pub redirect_uris: String,
    /// Defaults to [`DEFAULT_SCOPES`].
    pub scopes: String,
    pub website: String,
}

impl AppConfig {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            ..Self::default()
        }
    }

    fn redirect_uris(&self) -> &str {
        non_empty_or(&self.redirect_uris, OOB_REDIRECT_URI)
    }

    fn scopes(&self) -> &str {
        non_empty_or(&self.scopes, DEFAULT_SCOPES)
    }
}

/// A registered application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    pub id: Id,
    pub name: String,
    pub website: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Where to send the user to authorize this app.
    #[serde(skip)]
    pub auth_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

impl Client {
    /// Register an application (`POST /api/v1/apps`).
    pub async fn register_app(&self, ctx: &Context, app: &AppConfig) -> Result<App> {
        let mut params = Params::new();
        params
            .add("client_name", app.client_name.as_str())
            .add("redirect_uris", app.redirect_uris())
            .add("scopes", app.scopes())
            .add_opt("website", Some(app.website.as_str()));

        let mut registered: App = self
            .call(ctx, Method::POST, "/api/v1/apps", Some(&params), None)
            .await?;
        if registered.redirect_uri.is_empty() {
            registered.redirect_uri = app.redirect_uris().to_string();
        }
        registered.auth_uri = self.authorization_url(
            &registered.client_id,
            &registered.redirect_uri,
            app.scopes(),
        )?;
        debug!(client_id = %registered.client_id, "registered app");
        Ok(registered)
    }

    /// The `/oauth/authorize` URL a user opens to approve `client_id`.
    pub fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scopes: &str,
    ) -> Result<String> {
        let auth_url = self.endpoint_url("/oauth/authorize")?;
        let client = BasicClient::new(
            ClientId::new(client_id.to_string()),
            None,
            AuthUrl::new(auth_url.to_string()).map_err(|e| Error::Config(e.to_string()))?,
            None,
        )
        .set_redirect_uri(
            RedirectUrl::new(non_empty_or(redirect_uri, OOB_REDIRECT_URI).to_string())
                .map_err(|e| Error::Config(e.to_string()))?,
        );
        let (url, _csrf) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(
                non_empty_or(scopes, DEFAULT_SCOPES)
                    .split_whitespace()
                    .map(|s| Scope::new(s.to_string())),
            )
            .url();
        Ok(url.to_string())
    }

    /// Password grant. Any non-2xx response is reported as [`Error::Unauthorized`].
    pub async fn authenticate(&mut self, ctx: &Context, username: &str, password: &str) -> Result<()> {
        let params = self
            .grant_params("password")?
            .with("username", username)
            .with("password", password)
            .with("scope", DEFAULT_SCOPES);
        let token = match self.request_token(ctx, &params).await {
            Err(e) => match e.api_error() {
                Some(api) => return Err(Error::Unauthorized(api.clone())),
                None => return Err(e),
            },
            Ok(token) => token,
        };
        self.set_access_token(token);
        Ok(())
    }

    /// Client-credentials grant: an app-only token.
    pub async fn get_app_access_token(&mut self, ctx: &Context, redirect_uri: &str) -> Result<()> {
        let params = self
            .grant_params("client_credentials")?
            .with("redirect_uri", non_empty_or(redirect_uri, OOB_REDIRECT_URI));
        let token = self.request_token(ctx, &params).await?;
        self.set_access_token(token);
        Ok(())
    }

    /// Authorization-code grant: exchange the one-time `code` for a user token.
    pub async fn get_user_access_token(
        &mut self,
        ctx: &Context,
        code: &str,
        redirect_uri: &str,
    ) -> Result<()> {
        let params = self
            .grant_params("authorization_code")?
            .with("code", code)
            .with("redirect_uri", non_empty_or(redirect_uri, OOB_REDIRECT_URI));
        let token = self.request_token(ctx, &params).await?;
        self.set_access_token(token);
        Ok(())
    }

    fn grant_params(&self, grant_type: &str) -> Result<Params> {
        let (client_id, client_secret) = self.config().client_credentials()?;
        Ok(Params::new()
            .with("client_id", client_id)
            .with("client_secret", client_secret)
            .with("grant_type", grant_type))
    }

    async fn request_token(&self, ctx: &Context, params: &Params) -> Result<String> {
        let res: TokenResponse = self
            .call(ctx, Method::POST, "/oauth/token", Some(params), None)
            .await?;
        if res.access_token.is_empty() {
            return Err(Error::Protocol(
                "Token response missing access_token".into(),
            ));
        }
        Ok(res.access_token)
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}
