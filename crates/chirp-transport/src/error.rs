/// Errors that can occur in the transport layer.
///
/// A transport error always means "no usable response arrived". An HTTP
/// response with a 4xx or 5xx status is NOT an error at this layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The configured base URL can't be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The request could not be built (bad header, bad mime type).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request never produced a response (DNS, refused, reset, TLS).
    #[cfg(feature = "http")]
    #[error("request failed: {0}")]
    RequestFailed(#[source] reqwest::Error),

    /// A response arrived but its body could not be read.
    #[cfg(feature = "http")]
    #[error("reading response body failed: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// The connection went away before a response arrived.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
