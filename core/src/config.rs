//! Connection settings shared by the Chronos and Marathon clients.
//!
//! A `ClientConfig` starts from framework defaults and is adjusted with
//! chained `with_*` setters or environment overrides. Once handed to a client
//! it is never mutated.

use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const CHRONOS_PORT: u16 = 4400;
pub const CHRONOS_BASE_PATH: &str = "/scheduler";
pub const MARATHON_PORT: u16 = 8080;
pub const MARATHON_BASE_PATH: &str = "/v2";
pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid value `{value}` for {key}")]
    InvalidEnv { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    secure: bool,
    host: String,
    port: u16,
    base_path: String,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// `http://127.0.0.1:4400/scheduler`
    pub fn chronos() -> Self {
        Self::with_defaults(CHRONOS_PORT, CHRONOS_BASE_PATH)
    }

    /// `http://127.0.0.1:8080/v2`
    pub fn marathon() -> Self {
        Self::with_defaults(MARATHON_PORT, MARATHON_BASE_PATH)
    }

    fn with_defaults(port: u16, base_path: &str) -> Self {
        Self {
            secure: false,
            host: DEFAULT_HOST.to_string(),
            port,
            base_path: base_path.to_string(),
            base_url: None,
            timeout: None,
        }
    }

    /// Use https instead of http.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Overrides scheme, host, port and base path in one go.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Applies `{PREFIX}_URL`, `{PREFIX}_HOST`, `{PREFIX}_PORT`,
    /// `{PREFIX}_SECURE` and `{PREFIX}_TIMEOUT_MS` when they are set.
    pub fn with_env(self, prefix: &str) -> Result<Self, ConfigError> {
        self.with_lookup(prefix, |key| std::env::var(key).ok())
    }

    fn with_lookup(
        mut self,
        prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            let key = format!("{prefix}_{name}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((_, url)) = get("URL") {
            self.base_url = Some(url);
        }
        if let Some((_, host)) = get("HOST") {
            self.host = host;
        }
        if let Some((key, port)) = get("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key, value: port })?;
        }
        if let Some((key, secure)) = get("SECURE") {
            self.secure = match secure.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidEnv { key, value: secure }),
            };
        }
        if let Some((key, millis)) = get("TIMEOUT_MS") {
            let millis: u64 = millis
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key, value: millis })?;
            self.timeout = Some(Duration::from_millis(millis));
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The URL every request path is resolved against.
    pub fn base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }
        let scheme = if self.secure { "https" } else { "http" };
        let path = self.base_path.trim_matches('/');
        if path.is_empty() {
            format!("{scheme}://{}:{}", self.host, self.port)
        } else {
            format!("{scheme}://{}:{}/{path}", self.host, self.port)
        }
    }

    pub(crate) fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.base_url();
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw,
                reason: "not a hierarchical url".to_string(),
            });
        }
        Ok(url)
    }
}
