//! Transport abstraction layer for the Chirp client.
//!
//! Provides the [`Transport`] trait that turns a [`RequestDescriptor`]
//! into an [`HttpResponse`], plus the descriptor types themselves. The
//! layers above never see `reqwest`; they see descriptors and statuses.
//!
//! # Feature Flags
//!
//! - `http` (default) — [`HttpTransport`] via `reqwest`, with a cookie
//!   store so the session cookie rides on every request
//! - `mock` — [`mock::MockTransport`], a scripted in-memory backend for
//!   tests in downstream crates

mod error;
#[cfg(feature = "http")]
mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod request;

pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use request::{Body, HttpResponse, Method, MultipartFile, RequestDescriptor};

use std::fmt;

use rand::Rng;

/// Correlation id attached to every request and sent as `x-request-id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(rand::rng().random())
    }

    /// Creates a `RequestId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Sends a request and waits for the backend's answer.
///
/// Implementations must return `Ok` for every response that arrived,
/// whatever its status. `Err` is reserved for "no response at all".
pub trait Transport: Send + Sync + 'static {
    /// Issues the request described by `request`.
    fn send(
        &self,
        request: &RequestDescriptor,
    ) -> impl std::future::Future<Output = Result<HttpResponse, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_display_is_sixteen_hex_chars() {
        let id = RequestId::new(0xab);
        assert_eq!(id.to_string(), "00000000000000ab");
    }

    #[test]
    fn test_request_id_new_and_into_inner() {
        assert_eq!(RequestId::new(42).into_inner(), 42);
    }

    #[test]
    fn test_request_id_generate_differs() {
        // 64 random bits; a collision here means the generator is broken.
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
