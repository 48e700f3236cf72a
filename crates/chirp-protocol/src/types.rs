//! Core types for Chirp's REST wire format.
//!
//! Every type in this module is something that travels over HTTP between
//! the client and the backend: identities, request payloads, and the
//! success/failure envelopes the backend wraps its answers in.
//!
//! The backend speaks camelCase JSON with Mongo-style `_id` keys. Rust
//! code speaks snake_case. The `#[serde(rename = ...)]` attributes below
//! are the only place that translation happens.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The backend's identifier for a user account.
///
/// A newtype over `String` so a user id can't be passed where a post id
/// or an email is expected. `#[serde(transparent)]` keeps it a plain
/// string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated identity, as returned by every auth endpoint.
///
/// This is the value the session store holds while a user is logged in.
/// The client never sees the credential behind it: that rides in an
/// HttpOnly cookie the transport carries automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique account id (`_id` on the wire).
    #[serde(rename = "_id")]
    pub id: UserId,

    /// Display name.
    pub username: String,

    /// Login email.
    pub email: String,

    /// URL of the uploaded avatar, if the user has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Account creation timestamp (ISO-8601, as sent by the backend).
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

/// The `status` discriminator every backend envelope carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    #[default]
    Fail,
}

/// Successful answer from register, login, refresh, profile and avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSuccess {
    pub status: ResponseStatus,
    pub user: User,
}

impl AuthSuccess {
    /// Unwraps the identity, rejecting envelopes that claim failure.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`](crate::ProtocolError::InvalidMessage)
    /// if `status` is not `"success"`.
    pub fn into_user(self) -> Result<User, crate::ProtocolError> {
        match self.status {
            ResponseStatus::Success => Ok(self.user),
            ResponseStatus::Fail => Err(crate::ProtocolError::InvalidMessage(
                "auth response carried status \"fail\"".into(),
            )),
        }
    }
}

/// The body of every non-2xx response.
///
/// Decoding is lenient: a reverse proxy answering 502 won't follow the
/// backend's shape, so every field falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    #[serde(default)]
    pub status: ResponseStatus,

    /// Machine-readable error code, e.g. `USER_EXISTS`.
    #[serde(default)]
    pub code: String,

    /// Human-readable message, safe to show to the user.
    #[serde(default)]
    pub message: String,
}

/// Answer from `GET /users/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub user: User,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

// Passwords must never reach a log line, so Debug is written by hand.
impl fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPayload")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterPayload")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `PUT /auth/profile`. Only fields that changed are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfilePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UpdateProfilePayload {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}
