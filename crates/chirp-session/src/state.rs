//! The observable session value and the hooks the pipeline drives.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chirp_pipeline::SessionHooks;
use chirp_protocol::{Route, User};
use tokio::sync::watch;

use crate::Navigator;

/// Which phase of its lifecycle the session is in.
///
/// ```text
/// Restoring ──→ Authenticated ⇄ Unauthenticated
///     └──────────────────────────────↗
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Startup: the stored credential hasn't been checked yet.
    Restoring,
    Authenticated,
    Unauthenticated,
}

/// A point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The authenticated identity, or `None`.
    pub user: Option<User>,
    /// `true` until session restoration has finished.
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn phase(&self) -> SessionPhase {
        match (&self.user, self.loading) {
            (_, true) => SessionPhase::Restoring,
            (Some(_), false) => SessionPhase::Authenticated,
            (None, false) => SessionPhase::Unauthenticated,
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Shared, observable storage for the session.
///
/// Every clone writes to and reads from the same value. Writers are the
/// session store and the pipeline's [`SessionHooks`]; readers subscribe
/// and see every transition.
///
/// Each ended session (logout or hard reset) bumps a generation. A
/// renewal only lands if the generation it started under is still
/// current, so a refresh that was in flight during logout can't bring
/// the session back.
#[derive(Debug, Clone)]
pub struct SessionCell {
    tx: Arc<watch::Sender<SessionSnapshot>>,
    generation: Arc<AtomicU64>,
}

impl SessionCell {
    /// A fresh cell in the `Restoring` phase.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Self {
            tx: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Builds the hooks the request pipeline reports session outcomes to.
    ///
    /// A renewed session replaces the stored identity; a hard reset clears
    /// it and sends the user to the login page through `navigator`.
    pub fn hooks(&self, navigator: Arc<dyn Navigator>) -> Arc<dyn SessionHooks> {
        Arc::new(StoreHooks {
            cell: self.clone(),
            navigator,
            refresh_generation: AtomicU64::new(0),
        })
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub(crate) fn set_user(&self, user: Option<User>) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.user == user {
                return false;
            }
            snapshot.user = user;
            true
        });
    }

    /// Clears the identity and starts a new generation.
    ///
    /// Both happen under the channel's write lock, so they can't
    /// interleave with [`renew`](Self::renew).
    pub(crate) fn end_session(&self) {
        self.tx.send_if_modified(|snapshot| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            snapshot.user.take().is_some()
        });
    }

    /// Stores a renewed identity unless the session ended since
    /// `started`. Returns whether the renewal was applied.
    pub(crate) fn renew(&self, user: &User, started: u64) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|snapshot| {
            if self.generation.load(Ordering::SeqCst) != started {
                return false;
            }
            applied = true;
            if snapshot.user.as_ref() == Some(user) {
                return false;
            }
            snapshot.user = Some(user.clone());
            true
        });
        applied
    }

    pub(crate) fn finish_loading(&self) {
        self.tx.send_if_modified(|snapshot| std::mem::replace(&mut snapshot.loading, false));
    }
}

impl Default for SessionCell {
    fn default() -> Self {
        Self::new()
    }
}

struct StoreHooks {
    cell: SessionCell,
    navigator: Arc<dyn Navigator>,
    /// Generation captured when the current refresh went out.
    refresh_generation: AtomicU64,
}

impl SessionHooks for StoreHooks {
    fn refresh_started(&self) {
        self.refresh_generation.store(self.cell.generation(), Ordering::SeqCst);
    }

    fn session_renewed(&self, user: &User) {
        let started = self.refresh_generation.load(Ordering::SeqCst);
        if !self.cell.renew(user, started) {
            tracing::info!(user = %user.id, "session ended during refresh; renewal dropped");
        }
    }

    fn hard_reset(&self) {
        tracing::warn!("session lost; redirecting to login");
        self.cell.end_session();
        self.navigator.hard_redirect(Route::Login);
    }
}
