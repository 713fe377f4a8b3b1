//! Client configuration.
//!
//! `ClientConfig` gathers everything a capture client needs at construction:
//! the access token, an optional base-path override (useful for pointing at a
//! mock or staging deployment), and an optional transport timeout.

use std::time::Duration;

use crate::error::ApiError;

#[derive(Clone, Default)]
pub struct ClientConfig {
    pub access_token: String,
    /// Overrides the service's default versioned base path.
    pub base_path: Option<String>,
    /// Global deadline for each call, including reading the body.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_token", &"<redacted>")
            .field("base_path", &self.base_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(access_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            ..Default::default()
        }
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = Some(base_path.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `{prefix}_TOKEN` (required), `{prefix}_BASE_PATH` and
    /// `{prefix}_TIMEOUT_SECS` from the environment.
    pub fn from_env(prefix: &str) -> Result<Self, ApiError> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let token_key = format!("{prefix}_TOKEN");
        let access_token = lookup(&token_key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Config(format!("{token_key} is not set")))?;

        let base_path = lookup(&format!("{prefix}_BASE_PATH")).filter(|v| !v.is_empty());

        let timeout_key = format!("{prefix}_TIMEOUT_SECS");
        let timeout = match lookup(&timeout_key) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::Config(format!("{timeout_key} must be a whole number of seconds, got {raw:?}")))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            access_token,
            base_path,
            timeout,
        })
    }
}
