use crate::error::Error;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const BACKEND_URL_ENV: &str = "CERTIFICATE_BACKEND_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "CERTIFICATE_BACKEND_TIMEOUT_SECS";

/// Where the certificate backend lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub backend_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Defaults, overridden by the environment when the variables are set.
    pub fn from_env() -> Result<Self, Error> {
        let mut settings = Settings::default();
        if let Ok(backend_url) = std::env::var(BACKEND_URL_ENV) {
            settings.backend_url = backend_url;
        }
        if let Ok(timeout) = std::env::var(REQUEST_TIMEOUT_ENV) {
            settings.request_timeout_secs = timeout.trim().parse().map_err(|_| {
                Error::Other(format!("{} is not a number of seconds: `{}`", REQUEST_TIMEOUT_ENV, timeout))
            })?;
        }
        Ok(settings)
    }

    /// The backend URL, always ending in `/` so relative paths join below it.
    pub fn base_url(&self) -> Result<Url, Error> {
        let mut url = self.backend_url.trim().to_owned();
        if !url.ends_with('/') {
            url.push('/');
        }
        Ok(Url::parse(&url)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
