//! # Chirp
//!
//! Session-aware HTTP client core for the Chirp micro-blog.
//!
//! Chirp keeps a user logged in across an expiring session: every API call
//! goes through a pipeline that notices a 401, refreshes the session once
//! (no matter how many calls noticed), replays what was waiting, and
//! resets to the login page when the session can't be saved.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chirp::prelude::*;
//!
//! # async fn run() -> Result<(), ChirpError> {
//! chirp::init_tracing();
//!
//! let client = ChirpClient::connect(ClientConfig::from_env()?, Arc::new(MemoryNavigator::default()))?;
//! client.session().restore_session().await;
//!
//! let user = client
//!     .session()
//!     .login(&LoginPayload {
//!         email: "ada@example.com".into(),
//!         password: "correct horse".into(),
//!     })
//!     .await?;
//! println!("hello, {}", user.username);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;

pub use client::{ChirpApi, ChirpClient, ChirpPipeline, ChirpSession, HttpRefresher};
pub use config::{API_URL_ENV, ClientConfig};
pub use error::ChirpError;

pub use chirp_pipeline as pipeline;
pub use chirp_protocol as protocol;
pub use chirp_session as session;
pub use chirp_transport as transport;

/// Installs a `tracing` subscriber that writes to stderr.
///
/// The filter comes from `RUST_LOG` (e.g. `RUST_LOG=chirp_pipeline=debug`)
/// and defaults to `info`. Calling it twice is harmless. Libraries in this
/// workspace only emit events; installing the subscriber is the
/// application's call.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Everything a front end usually needs, in one import.
pub mod prelude {
    pub use crate::{ChirpClient, ChirpError, ClientConfig};
    pub use chirp_pipeline::ApiError;
    pub use chirp_protocol::{
        LoginPayload, RegisterPayload, Route, UpdateProfilePayload, User, UserId,
    };
    pub use chirp_session::{
        AvatarUpload, MemoryNavigator, Navigator, ProfileUpdate, SessionPhase, SessionSnapshot,
    };
}
