//! ERP endpoint configuration.

use std::time::Duration;

use thiserror::Error;

/// Env var holding the ERP finished-goods endpoint URL.
pub const ENDPOINT_VAR: &str = "GUDANG_ERP_ENDPOINT";
/// Env var holding the ERP bearer token.
pub const TOKEN_VAR: &str = "GUDANG_ERP_TOKEN";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Required endpoint/token configuration is missing.
///
/// Fatal for the sync attempt: surfaced to the user, never retried
/// automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0} is not set")]
    Missing(&'static str),
}

/// Connection settings for the upstream ERP.
///
/// The bearer token comes from server-side configuration and must never
/// reach the presentation layer; `Debug` redacts it.
#[derive(Clone)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub token: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read endpoint and token from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = read_var(ENDPOINT_VAR)?;
        let token = read_var(TOKEN_VAR)?;
        Ok(Self::new(endpoint, token))
    }
}

impl core::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn read_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}
