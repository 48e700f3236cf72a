//! Client configuration.

use crate::ChirpError;

/// Environment variable holding the backend origin.
pub const API_URL_ENV: &str = "CHIRP_API_URL";

/// Where the backend lives.
///
/// Sensible defaults are provided for a local development backend. Create
/// one with `ClientConfig::default()` and override what you need, or read
/// the origin from the environment with [`from_env`](Self::from_env).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://api.chirp.social`.
    ///
    /// Default: `http://127.0.0.1:5000`.
    pub base_url: String,

    /// Path every API endpoint lives under.
    ///
    /// Default: `/api/v1`.
    pub api_prefix: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            api_prefix: "/api/v1".to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the origin taken from `CHIRP_API_URL` when set.
    ///
    /// # Errors
    /// [`ChirpError::Config`] if the variable is set but isn't an
    /// `http`/`https` URL.
    pub fn from_env() -> Result<Self, ChirpError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChirpError> {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_ENV) {
            config = config.with_base_url(url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Sets the backend origin. A trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// Sets the API prefix.
    pub fn with_api_prefix(mut self, api_prefix: impl Into<String>) -> Self {
        self.api_prefix = api_prefix.into();
        self
    }

    /// Checks the settings without touching the network.
    ///
    /// # Errors
    /// [`ChirpError::Config`] describing the first bad setting.
    pub fn validate(&self) -> Result<(), ChirpError> {
        if self.base_url.is_empty() {
            return Err(ChirpError::Config(format!("{API_URL_ENV} is empty")));
        }
        let has_scheme = ["http://", "https://"]
            .iter()
            .any(|scheme| self.base_url.starts_with(scheme) && self.base_url.len() > scheme.len());
        if !has_scheme {
            return Err(ChirpError::Config(format!(
                "base url must be an http(s) origin, got {:?}",
                self.base_url
            )));
        }
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(ChirpError::Config(format!(
                "api prefix must start with '/', got {:?}",
                self.api_prefix
            )));
        }
        Ok(())
    }
}
