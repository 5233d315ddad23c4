use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const BASE_URL_VAR: &str = "LMS_API_BASE_URL";
pub const TOKEN_VAR: &str = "LMS_API_TOKEN";
pub const TIMEOUT_VAR: &str = "LMS_API_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where and how to reach the LMS backend.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the configuration from the environment.
    ///
    /// Returns `Ok(None)` when no base URL is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a malformed URL or timeout.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(base_url) = env::var(BASE_URL_VAR).ok().filter(|v| !v.trim().is_empty()) else {
            return Ok(None);
        };
        Self::new(&base_url)?.with_env_overrides().map(Some)
    }

    /// Apply the token and timeout variables, if set, on top of this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a malformed timeout.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(token) = env::var(TOKEN_VAR) {
            self = self.with_token(token);
        }
        if let Ok(raw) = env::var(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: TIMEOUT_VAR,
                raw: raw.clone(),
                reason: "expected whole seconds".into(),
            })?;
            self = self.with_timeout(Duration::from_secs(secs.max(1)));
        }
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve an API path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: BASE_URL_VAR,
        raw: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    // `Url::join` replaces the last segment unless the base ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
