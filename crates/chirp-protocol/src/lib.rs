//! Wire protocol for the Chirp client.
//!
//! This crate defines what the client and the REST backend say to each
//! other:
//!
//! - **Types** ([`User`], [`AuthSuccess`], [`ApiFailure`], payloads) —
//!   the JSON bodies that travel over HTTP.
//! - **Routes** ([`Route`], [`endpoints`]) — where requests go, and where
//!   the session layer may send the user.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how bodies become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (typed bodies) → Pipeline / Session
//! ```

mod codec;
mod error;
mod routes;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use routes::{Route, endpoints};
pub use types::{
    ApiFailure, AuthSuccess, LoginPayload, PublicProfile, RegisterPayload,
    ResponseStatus, UpdateProfilePayload, User, UserId,
};
