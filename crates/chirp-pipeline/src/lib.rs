//! Request pipeline for the Chirp client.
//!
//! Every API call goes through a [`RequestPipeline`]. It sends the request,
//! sorts the answer into an [`ApiError`] kind, and makes session expiry
//! invisible to callers:
//!
//! - at most one refresh call is ever outstanding ([`RefreshState`]),
//! - requests that hit a 401 while it runs are queued and replayed in
//!   arrival order once it succeeds,
//! - every request is retried at most once,
//! - when the refresh fails, everything queued fails with the refresh
//!   error and the session is hard-reset once ([`SessionHooks`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← login/logout/profile, owns the identity
//!     ↕  SessionHooks (renewed / hard reset)
//! Pipeline (this crate)  ← dispatch, classify, refresh, replay
//!     ↕  Transport + Refresher
//! Transport Layer (below) ← bytes over HTTP, cookies
//! ```
//!
//! The pipeline has no timeout of its own: a refresh call that never
//! returns stalls every request queued behind it. Callers that need a
//! deadline wrap `execute` in `tokio::time::timeout`.

mod error;
mod hooks;
mod pipeline;
mod refresh;
mod refresher;

pub use error::{ApiError, classify};
pub use hooks::SessionHooks;
pub use pipeline::RequestPipeline;
pub use refresh::RefreshState;
pub use refresher::{EndpointRefresher, Refresher};
