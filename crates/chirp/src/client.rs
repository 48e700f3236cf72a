//! `ChirpClient`: startup wiring for the whole stack.
//!
//! Ties the layers together in dependency order:
//! transport → refresher → session cell + hooks → pipeline → auth api → store.
//! Nothing here talks to the network; the first request is whatever the
//! front end calls first (usually [`SessionStore::restore_session`]).

use std::sync::Arc;

use chirp_pipeline::{EndpointRefresher, RequestPipeline};
use chirp_session::{AuthApi, Navigator, SessionCell, SessionStore};
use chirp_transport::HttpTransport;

use crate::{ChirpError, ClientConfig};

/// The refresh call used in production: `GET /auth/refresh` over HTTP.
pub type HttpRefresher = EndpointRefresher<HttpTransport>;

/// The request pipeline over HTTP.
pub type ChirpPipeline = RequestPipeline<HttpTransport, HttpRefresher>;

/// The auth endpoints over HTTP.
pub type ChirpApi = AuthApi<HttpTransport, HttpRefresher>;

/// The session store over HTTP.
pub type ChirpSession = SessionStore<HttpTransport, HttpRefresher>;

/// A configured client. Cheap to clone; clones share the cookie jar,
/// the refresh state and the session.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use chirp::prelude::*;
///
/// # async fn run() -> Result<(), ChirpError> {
/// let navigator = Arc::new(MemoryNavigator::default());
/// let client = ChirpClient::connect(ClientConfig::from_env()?, navigator)?;
///
/// if client.session().restore_session().await == SessionPhase::Authenticated {
///     println!("welcome back");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChirpClient {
    config: ClientConfig,
    session: ChirpSession,
}

impl ChirpClient {
    /// Builds the stack for `config`, reporting navigations to `navigator`.
    ///
    /// # Errors
    /// [`ChirpError::Config`] or [`ChirpError::Transport`] if the
    /// configuration doesn't describe a usable backend URL.
    pub fn connect(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ChirpError> {
        config.validate()?;

        let transport = HttpTransport::new(&config.base_url, &config.api_prefix)?;
        let refresher = EndpointRefresher::new(transport.clone());

        let cell = SessionCell::new();
        let hooks = cell.hooks(Arc::clone(&navigator));
        let pipeline = RequestPipeline::new(transport, refresher, hooks);

        let session = SessionStore::new(AuthApi::new(pipeline), cell, navigator);

        tracing::info!(
            base_url = %config.base_url,
            api_prefix = %config.api_prefix,
            "chirp client ready"
        );
        Ok(Self { config, session })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The session store: login, logout, profile, and the current identity.
    pub fn session(&self) -> &ChirpSession {
        &self.session
    }

    /// Typed auth endpoints, for calls that shouldn't touch the session
    /// (e.g. viewing someone else's profile).
    pub fn api(&self) -> &ChirpApi {
        self.session.api()
    }

    /// The raw pipeline, for endpoints this crate doesn't wrap.
    pub fn pipeline(&self) -> &ChirpPipeline {
        self.session.api().pipeline()
    }
}

#[cfg(test)]
mod tests {
    use chirp_session::MemoryNavigator;

    use super::*;

    #[test]
    fn test_connect_with_default_config() {
        let client =
            ChirpClient::connect(ClientConfig::default(), Arc::new(MemoryNavigator::default()))
                .unwrap();
        assert!(!client.session().is_authenticated());
        assert!(client.session().snapshot().loading);
        assert_eq!(
            client.pipeline().transport().base_url(),
            "http://127.0.0.1:5000/api/v1"
        );
    }

    #[test]
    fn test_connect_rejects_bad_config() {
        let config = ClientConfig::default().with_base_url("localhost:5000");
        let result = ChirpClient::connect(config, Arc::new(MemoryNavigator::default()));
        assert!(matches!(result, Err(ChirpError::Config(_))));
    }
}
