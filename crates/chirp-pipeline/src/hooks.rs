//! Callbacks the pipeline fires into the session layer.

use chirp_protocol::User;

/// How the pipeline reports refresh outcomes to whoever owns the session.
///
/// The pipeline sits below the session store, so it can't call the store
/// directly. The store hands it an implementation of this trait at
/// startup instead.
pub trait SessionHooks: Send + Sync + 'static {
    /// A refresh call is about to go out. Paired with exactly one
    /// `session_renewed` or `hard_reset` once it settles.
    fn refresh_started(&self) {}

    /// A refresh succeeded and returned this identity.
    ///
    /// The session may have ended while the refresh was in flight; the
    /// owner decides whether the renewal still applies.
    fn session_renewed(&self, user: &User);

    /// Recovery is impossible: drop the session and send the user to the
    /// login entry point with a full navigation.
    ///
    /// Called at most once per failed recovery, never once per queued
    /// request.
    fn hard_reset(&self);
}
