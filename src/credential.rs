//! Secrets for the front-end (access token, client secret) kept in the system keyring.
//!
//! The library never persists credentials; this module is how the TUI survives a restart
//! without writing secrets into `config.toml`.

use keyring::Entry;
use url::Url;

use crate::error::{Error, Result};

const SERVICE_NAME: &str = "tootline";

/// What is stored for a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secret {
    AccessToken,
    ClientSecret,
}

impl Secret {
    fn account(self, host: &str) -> String {
        match self {
            Self::AccessToken => format!("{host}@oauth"),
            Self::ClientSecret => format!("{host}@client_secret"),
        }
    }
}

fn entry(secret: Secret, host: &str) -> Result<Entry> {
    Entry::new(SERVICE_NAME, &secret.account(host)).map_err(keyring_error)
}

fn keyring_error(e: keyring::Error) -> Error {
    Error::Credential(e.to_string())
}

pub fn store(secret: Secret, host: &str, value: &str) -> Result<()> {
    entry(secret, host)?.set_password(value).map_err(keyring_error)
}

/// `None` when nothing is stored yet.
pub fn load(secret: Secret, host: &str) -> Result<Option<String>> {
    match entry(secret, host)?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(keyring_error(e)),
    }
}

/// Forget a stored secret (logout, or a token the server rejected).
pub fn delete(secret: Secret, host: &str) -> Result<()> {
    match entry(secret, host)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(keyring_error(e)),
    }
}

/// Host part of a server URL, used to scope keyring entries.
pub fn instance_host_from_url(server: &str) -> Result<String> {
    let url = Url::parse(server).map_err(|e| Error::Config(format!("{server}: {e}")))?;
    url.host_str()
        .map(str::to_string)
        .ok_or_else(|| Error::Config(format!("{server} has no host")))
}
