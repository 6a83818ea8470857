//! Client configuration and its on-disk form.
//!
//! [`Config`] holds everything a [`crate::Client`] needs. Only the non-secret half
//! (server and client id) is serialized; the client secret and access token are kept by
//! the credential store, see credential.rs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Instance base URL (e.g. https://mastodon.social). May carry a path prefix.
    pub server: String,
    /// OAuth app client id (public; safe in config file)
    #[serde(default)]
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: String,
    #[serde(skip)]
    pub access_token: String,
}

impl Config {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn with_client(mut self, client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self.client_secret = secret.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    /// Parsed server URL; the scheme must be http or https.
    pub fn server_url(&self) -> Result<Url> {
        if self.server.is_empty() {
            return Err(Error::Config("server URL is empty".into()));
        }
        let url = Url::parse(&self.server)
            .map_err(|e| Error::Config(format!("invalid server URL {:?}: {e}", self.server)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::Config(format!(
                "server URL scheme must be http or https, got {other:?}"
            ))),
        }
    }

    /// Client id and secret, or a config error naming the missing one.
    pub(crate) fn client_credentials(&self) -> Result<(&str, &str)> {
        if self.client_id.is_empty() {
            return Err(Error::Config("client_id is empty".into()));
        }
        if self.client_secret.is_empty() {
            return Err(Error::Config("client_secret is empty".into()));
        }
        Ok((&self.client_id, &self.client_secret))
    }

    pub(crate) fn require_access_token(&self) -> Result<&str> {
        if self.access_token.is_empty() {
            return Err(Error::Config("access_token is empty".into()));
        }
        Ok(&self.access_token)
    }
}

/// Returns the XDG config directory (e.g. ~/.config/tootline).
pub fn config_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("org", "tootline", "tootline")
        .map(|d| d.config_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Could not determine config directory".into()))
}

/// Path to the config file (TOML, non-secret data only).
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Load config from disk if it exists. `TOOTLINE_SERVER` overrides the stored server.
pub fn load_config() -> Result<Option<Config>> {
    let server = std::env::var("TOOTLINE_SERVER").ok();
    load_config_from(&config_path()?, server.as_deref())
}

/// Load config from `path`. A non-blank `server_override` replaces the stored server,
/// keeping the stored client id only when it already belongs to that server.
pub fn load_config_from(path: &Path, server_override: Option<&str>) -> Result<Option<Config>> {
    let stored = if path.exists() {
        let s = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        let config: Config = toml::from_str(&s)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {e}")))?;
        Some(config)
    } else {
        None
    };
    match server_override.map(str::trim) {
        Some(server) if !server.is_empty() => {
            let server = server.trim_end_matches('/').to_string();
            Ok(Some(match stored {
                Some(cfg) if cfg.server == server => cfg,
                _ => Config::new(server),
            }))
        }
        _ => Ok(stored),
    }
}

/// Save non-secret config to disk. Caller must persist secrets via credential module.
pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(&config_dir()?, config)
}

pub fn save_config_to(dir: &Path, config: &Config) -> Result<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| Error::Config(format!("Failed to create config dir: {e}")))?;
    let s = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
    std::fs::write(dir.join(CONFIG_FILE), s)
        .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
    Ok(())
}
