//! Navigation side effects the session layer triggers.
//!
//! The store never renders anything. It only announces where the user
//! should go next, and the front end decides what that means: a router
//! push in a browser shell, a line on stderr in a CLI, a recorded entry
//! in a test.

use std::sync::{Mutex, PoisonError};

use chirp_protocol::Route;

/// Where the session layer sends the user.
///
/// Two kinds of navigation exist. [`navigate`](Self::navigate) is the
/// ordinary in-app move after a successful login or registration.
/// [`hard_redirect`](Self::hard_redirect) is the last-resort reset after
/// the session is lost for good: it must work even if no view is mounted,
/// and implementations should discard in-flight application state.
pub trait Navigator: Send + Sync + 'static {
    /// The path the user is currently on, e.g. `"/login"`.
    fn current_path(&self) -> String;

    /// In-app navigation.
    fn navigate(&self, route: Route);

    /// Full reset to `route`, dropping any in-memory application state.
    fn hard_redirect(&self, route: Route);
}

/// One entry in a [`MemoryNavigator`]'s history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Push(Route),
    HardRedirect(Route),
}

/// A [`Navigator`] that keeps its location and history in memory.
///
/// Used by headless front ends and tests.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<(String, Vec<Navigation>)>,
}

impl MemoryNavigator {
    /// Starts at `path` with an empty history.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new((path.into(), Vec::new())),
        }
    }

    /// Every navigation so far, oldest first.
    pub fn history(&self) -> Vec<Navigation> {
        self.lock().1.clone()
    }

    /// Number of hard redirects so far.
    pub fn hard_redirects(&self) -> usize {
        self.lock()
            .1
            .iter()
            .filter(|n| matches!(n, Navigation::HardRedirect(_)))
            .count()
    }

    fn record(&self, navigation: Navigation, route: Route) {
        let mut state = self.lock();
        state.0 = route.path().to_string();
        state.1.push(navigation);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, (String, Vec<Navigation>)> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(Route::Home.path())
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.lock().0.clone()
    }

    fn navigate(&self, route: Route) {
        self.record(Navigation::Push(route), route);
    }

    fn hard_redirect(&self, route: Route) {
        self.record(Navigation::HardRedirect(route), route);
    }
}
