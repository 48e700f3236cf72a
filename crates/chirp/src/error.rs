//! Unified error type for the Chirp client.

use chirp_pipeline::ApiError;
use chirp_protocol::ProtocolError;
use chirp_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `chirp` facade you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates the `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ChirpError {
    /// Invalid client configuration (missing or malformed setting).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A transport-level error (bad URL, connection failure).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An API call failed (rejected, server error, session lost).
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ChirpError {
    /// Text suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Transport(err) => ApiError::Network(err.to_string()).user_message(),
            other => other.to_string(),
        }
    }
}
