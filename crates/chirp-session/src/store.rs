//! The session store: the single owner of "who is logged in".
//!
//! ## Lifecycle
//!
//! ```text
//! restore_session() ──→ [Authenticated] ──→ logout() / hard reset ──→ [Unauthenticated]
//!        │                    ↑  update_profile() / update_avatar()          │
//!        └──→ [Unauthenticated] ──────────── login() ────────────────────────┘
//! ```

use std::sync::Arc;

use chirp_pipeline::{ApiError, Refresher};
use chirp_protocol::{LoginPayload, RegisterPayload, Route, User};
use chirp_transport::Transport;
use tokio::sync::watch;

use crate::{AuthApi, AvatarUpload, Navigator, ProfileUpdate, SessionCell, SessionPhase, SessionSnapshot};

/// Holds the authenticated identity and the operations that change it.
///
/// Cheap to clone; clones share the same session.
pub struct SessionStore<T, R> {
    api: AuthApi<T, R>,
    cell: SessionCell,
    navigator: Arc<dyn Navigator>,
}

impl<T, R> Clone for SessionStore<T, R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            cell: self.cell.clone(),
            navigator: Arc::clone(&self.navigator),
        }
    }
}

impl<T: Transport, R: Refresher> SessionStore<T, R> {
    /// `cell` must be the one whose [`hooks`](SessionCell::hooks) were
    /// given to the pipeline behind `api`, so refresh outcomes land in
    /// this store.
    pub fn new(api: AuthApi<T, R>, cell: SessionCell, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            cell,
            navigator,
        }
    }

    /// Restores a session from the credential cookie, once at startup.
    ///
    /// On a public route (login, register) no request is made, so an
    /// expired cookie can't bounce the user back to the page they are
    /// already on. Otherwise the refresh endpoint decides: success sets
    /// the identity, any failure leaves the session empty. Loading is
    /// cleared last in every case.
    pub async fn restore_session(&self) -> SessionPhase {
        let path = self.navigator.current_path();

        if Route::from_path(&path).is_some_and(Route::is_public) {
            tracing::debug!(path = %path, "public route; skipping session restore");
        } else {
            match self.api.refresh().await {
                Ok(user) => {
                    tracing::info!(user = %user.id, "session restored");
                    self.cell.set_user(Some(user));
                }
                Err(err) => {
                    tracing::debug!(error = %err, "no session to restore");
                    self.cell.set_user(None);
                }
            }
        }

        self.cell.finish_loading();
        self.cell.snapshot().phase()
    }

    /// Logs in and navigates home.
    ///
    /// # Errors
    /// The API error, unchanged, for the form to display. The session is
    /// not touched on failure.
    pub async fn login(&self, payload: &LoginPayload) -> Result<User, ApiError> {
        let user = self.api.login(payload).await?;
        tracing::info!(user = %user.id, "logged in");
        self.cell.set_user(Some(user.clone()));
        self.navigator.navigate(Route::Home);
        Ok(user)
    }

    /// Creates an account and navigates to the login page.
    ///
    /// Registration does not log the user in.
    ///
    /// # Errors
    /// The API error, unchanged.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<User, ApiError> {
        let user = self.api.register(payload).await?;
        tracing::info!(user = %user.id, "account created");
        self.navigator.navigate(Route::Login);
        Ok(user)
    }

    /// Ends the session. Never fails: a failed logout call is logged and
    /// the local session is cleared anyway.
    pub async fn logout(&self) {
        if let Err(err) = self.api.logout().await {
            tracing::warn!(error = %err, "logout request failed; clearing session anyway");
        }
        self.cell.end_session();
        tracing::info!("logged out");
    }

    /// Sends the changed profile fields and stores the returned identity.
    ///
    /// # Errors
    /// The API error; the session keeps its previous identity.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let user = self.api.update_profile(update).await?;
        tracing::info!(user = %user.id, "profile updated");
        self.cell.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Uploads a new avatar and stores the returned identity.
    ///
    /// # Errors
    /// The API error; the session keeps its previous identity.
    pub async fn update_avatar(&self, upload: &AvatarUpload) -> Result<User, ApiError> {
        let user = self.api.upload_avatar(upload).await?;
        tracing::info!(user = %user.id, bytes = upload.len(), "avatar updated");
        self.cell.set_user(Some(user.clone()));
        Ok(user)
    }

    pub fn current_user(&self) -> Option<User> {
        self.cell.snapshot().user
    }

    pub fn is_authenticated(&self) -> bool {
        self.cell.snapshot().user.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.cell.snapshot()
    }

    /// A receiver that observes every session transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.cell.subscribe()
    }

    pub fn api(&self) -> &AuthApi<T, R> {
        &self.api
    }
}
