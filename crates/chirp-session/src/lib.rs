//! Session management for the Chirp client.
//!
//! This crate owns the authenticated identity:
//!
//! 1. **Session store** — who is logged in, and the operations that change
//!    it ([`SessionStore`])
//! 2. **Observation** — every transition is published on a watch channel
//!    ([`SessionCell`], [`SessionSnapshot`])
//! 3. **Auth API** — typed wrappers over the auth endpoints ([`AuthApi`])
//! 4. **Validation** — profile and avatar input checked before sending
//!    ([`ProfileUpdate`], [`AvatarUpload`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Front end (above)  ← reads snapshots, calls login/logout/…, implements Navigator
//!     ↕
//! Session Layer (this crate)  ← owns the identity, implements SessionHooks
//!     ↕
//! Pipeline (below)  ← dispatch, refresh, replay
//! ```
//!
//! The pipeline is built before the store, so the store's write side is
//! split out as a [`SessionCell`]. Wiring order:
//!
//! ```rust,ignore
//! let cell = SessionCell::new();
//! let pipeline = RequestPipeline::new(transport, refresher, cell.hooks(navigator.clone()));
//! let store = SessionStore::new(AuthApi::new(pipeline), cell, navigator);
//! ```

mod api;
mod nav;
mod profile;
mod state;
mod store;

pub use api::AuthApi;
pub use nav::{MemoryNavigator, Navigation, Navigator};
pub use profile::{AVATAR_FIELD, AvatarUpload, ImageType, MAX_AVATAR_BYTES, ProfileUpdate};
pub use state::{SessionCell, SessionPhase, SessionSnapshot};
pub use store::SessionStore;
