//! Instance credentials
//!
//! The instance URL and API token are read once at startup from
//! `MISSKEY_URL` and `MISSKEY_TOKEN` and handed to the client explicitly.
//!
//! The token needs the Drive read/write and emoji view/manage permissions,
//! which usually means it has to belong to an admin or moderator.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

/// Environment variable holding the instance base URL
pub const URL_ENV: &str = "MISSKEY_URL";

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "MISSKEY_TOKEN";

/// Base URL and bearer token for one Misskey instance
#[derive(Clone)]
pub struct Credentials {
    base_url: Url,
    token: String,
}

impl Credentials {
    /// Validate raw values. Empty values count as missing.
    pub fn new(url: Option<&str>, token: Option<&str>) -> Result<Self> {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Config(format!("{URL_ENV} environment variable is not set")))?;
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Config(format!("{TOKEN_ENV} environment variable is not set")))?;

        let base_url = Url::parse(url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "{URL_ENV} must be an http or https URL, got '{url}'"
            )));
        }

        Ok(Self {
            base_url,
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Full URL of an API endpoint, e.g. `drive/files/create`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}
