//! Codec trait and implementations for API request and response bodies.
//!
//! The layers above the transport never touch `serde_json` directly: they
//! go through a [`Codec`]. Swapping the body format (or stubbing it in a
//! test) then means swapping one value instead of editing every call site.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values into request bodies and decodes response bodies.
///
/// ## Trait bounds
///
/// - `Send + Sync` → one codec is shared by every request task.
/// - `'static` → it lives as long as the client that owns it.
///
/// `decode` asks for `DeserializeOwned` because response buffers are
/// dropped as soon as the value is built.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a request body.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a response body.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that speaks JSON, the only format the Chirp backend serves.
///
/// ## Example
///
/// ```rust
/// use chirp_protocol::{Codec, JsonCodec, LoginPayload};
///
/// let codec = JsonCodec;
/// let payload = LoginPayload {
///     email: "ada@example.com".into(),
///     password: "hunter22".into(),
/// };
///
/// let bytes = codec.encode(&payload).unwrap();
/// let value: serde_json::Value = codec.decode(&bytes).unwrap();
/// assert_eq!(value["email"], "ada@example.com");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
