//! Client routes and backend endpoint paths.
//!
//! Endpoint paths are relative to the API prefix (`/api/v1`); the
//! transport prepends the base URL and prefix when it builds the URL.

use std::fmt;

/// Backend endpoint paths consumed by the client.
pub mod endpoints {
    pub const REGISTER: &str = "/auth/register";
    pub const LOGIN: &str = "/auth/login";
    /// Renews the short-lived session cookie from the long-lived one.
    pub const REFRESH: &str = "/auth/refresh";
    pub const LOGOUT: &str = "/auth/logout";
    pub const PROFILE: &str = "/auth/profile";
    pub const AVATAR: &str = "/auth/avatar";

    use crate::{ProtocolError, UserId};

    /// `GET /users/{id}`: a user's public profile.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidPathSegment`] for an id that can't stand
    /// as a single path segment.
    pub fn users_profile(id: &UserId) -> Result<String, ProtocolError> {
        Ok(format!("/users/{}", path_segment(id.as_str())?))
    }

    /// Percent-encodes `raw` so it stays one path segment.
    ///
    /// Only unreserved characters pass through. Empty and dot segments
    /// are rejected: URL parsing drops or resolves them even when encoded.
    pub fn path_segment(raw: &str) -> Result<String, ProtocolError> {
        if matches!(raw, "" | "." | "..") {
            return Err(ProtocolError::InvalidPathSegment(raw.to_string()));
        }
        let mut out = String::with_capacity(raw.len());
        for byte in raw.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
                out.push(char::from(byte));
            } else {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
        Ok(out)
    }
}

/// A client-side route the session layer may navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The feed.
    Home,
    Login,
    Register,
    Profile,
}

impl Route {
    /// The URL path for this route.
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Profile => "/profile",
        }
    }

    /// Public routes are reachable without a session.
    ///
    /// Session restoration skips the network on these so an expired
    /// cookie can't bounce the user from `/login` back to `/login`.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// Maps a path back to a route. Query strings and a trailing slash
    /// are ignored; unknown paths return `None`.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        [Self::Home, Self::Login, Self::Register, Self::Profile]
            .into_iter()
            .find(|route| route.path() == trimmed)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
