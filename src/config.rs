//! client configuration, read from a JSON file or the environment

use std::path::Path;
use std::time::Duration;

use crate::errors::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Backend paths for the auth operations.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login: String,
    pub signup: String,
    pub refresh: String,
    pub logout: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/api/auth/login".to_string(),
            signup: "/api/auth/signup".to_string(),
            refresh: "/auth/refresh".to_string(),
            logout: "/auth/logout".to_string(),
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Serialize concurrent refreshes so that simultaneous 401s share one refresh call.
    #[serde(default = "default_dedupe_refresh")]
    pub dedupe_refresh: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_dedupe_refresh() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("chat-auth-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            endpoints: Endpoints::default(),
            dedupe_refresh: default_dedupe_refresh(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    pub fn from_values(base_url: impl Into<String>, timeout_secs: Option<u64>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ..Self::default()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// # ENV Vars
    /// * `CHAT_API_URL` - Backend base URL, defaults to `http://localhost:8080`
    /// * `CHAT_API_TIMEOUT_SECS` - Per-request timeout in seconds, defaults to 10
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("CHAT_API_URL").unwrap_or_else(|_| default_base_url());
        let timeout_secs = match std::env::var("CHAT_API_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| {
                Error::Config(format!("Invalid CHAT_API_TIMEOUT_SECS '{}': {}", raw, e))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self::from_values(base_url, Some(timeout_secs)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), Error> {
        reqwest::Url::parse(&self.base_url).map_err(|e| {
            Error::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Joins the base URL and a request path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
