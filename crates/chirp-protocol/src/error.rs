//! Error types for the protocol layer.
//!
//! Each crate in Chirp defines its own error enum. A `ProtocolError`
//! always means the bytes and the Rust types disagreed, never that the
//! network or the backend misbehaved.

/// Errors that can occur while encoding or decoding API bodies.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: the backend returned HTML from a proxy, a required
    /// field is missing, or the body was truncated.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The body decoded but breaks a rule of the API contract, e.g. an
    /// auth response whose `status` is not `"success"`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A value can't be placed in a URL path as a single segment.
    #[error("invalid path segment: {0:?}")]
    InvalidPathSegment(String),
}
