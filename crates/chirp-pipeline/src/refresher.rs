//! The injected refresh call.
//!
//! The pipeline needs to renew the session, and the code that knows how
//! to call `/auth/refresh` is built on top of the pipeline. Instead of a
//! circular dependency, the refresh call is handed to the pipeline at
//! construction as a [`Refresher`].

use std::future::Future;

use chirp_protocol::{AuthSuccess, Codec, JsonCodec, User, endpoints};
use chirp_transport::{RequestDescriptor, Transport};

use crate::{ApiError, classify};

/// Renews the session and returns the identity behind it.
///
/// Any async closure `Fn() -> impl Future<Output = Result<User, ApiError>>`
/// is a `Refresher`, so tests can inject one inline.
pub trait Refresher: Send + Sync + 'static {
    fn refresh(&self) -> impl Future<Output = Result<User, ApiError>> + Send;
}

impl<F, Fut> Refresher for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<User, ApiError>> + Send,
{
    fn refresh(&self) -> impl Future<Output = Result<User, ApiError>> + Send {
        self()
    }
}

/// Calls `GET /auth/refresh` straight on the transport.
///
/// It deliberately bypasses the pipeline: a 401 from the refresh endpoint
/// must surface as a refresh failure, not trigger another recovery.
#[derive(Debug, Clone)]
pub struct EndpointRefresher<T, C = JsonCodec> {
    transport: T,
    codec: C,
}

impl<T: Transport> EndpointRefresher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            codec: JsonCodec,
        }
    }
}

impl<T: Transport, C: Codec> EndpointRefresher<T, C> {
    pub fn with_codec(transport: T, codec: C) -> Self {
        Self { transport, codec }
    }
}

impl<T: Transport, C: Codec> Refresher for EndpointRefresher<T, C> {
    async fn refresh(&self) -> Result<User, ApiError> {
        let request = RequestDescriptor::get(endpoints::REFRESH);
        let response = classify(self.transport.send(&request).await?)?;
        let envelope: AuthSuccess = self.codec.decode(&response.body)?;
        Ok(envelope.into_user()?)
    }
}
