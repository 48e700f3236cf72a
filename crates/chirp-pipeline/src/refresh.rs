//! In-flight refresh bookkeeping: the flag and the queue behind it.
//!
//! Both live behind one mutex so "is a refresh running? if not, I'm
//! running it" is a single critical section. Two tasks can never both
//! see `in_progress == false` and both start a refresh.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chirp_transport::{HttpResponse, RequestDescriptor};
use tokio::sync::oneshot;

use crate::ApiError;

/// Where a deferred request's outcome is delivered.
pub(crate) type ReplySender = oneshot::Sender<Result<HttpResponse, ApiError>>;

/// A request parked until the in-flight refresh settles.
#[derive(Debug)]
pub(crate) struct Deferred {
    pub(crate) request: RequestDescriptor,
    pub(crate) reply: ReplySender,
}

/// Result of [`RefreshState::begin_or_enqueue`].
#[derive(Debug)]
pub(crate) enum Admission {
    /// No refresh was running; the caller now owns the refresh and gets
    /// its request back to reissue once it settles.
    Leader(Deferred),
    /// A refresh is already running; the request joined the queue at
    /// this 1-based position.
    Queued { position: usize },
}

#[derive(Debug, Default)]
struct Inner {
    in_progress: bool,
    queue: VecDeque<Deferred>,
}

/// The refresh flag and the FIFO of requests waiting on it.
#[derive(Debug, Default)]
pub struct RefreshState {
    inner: Mutex<Inner>,
}

impl RefreshState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims the refresh or joins the queue.
    pub(crate) fn begin_or_enqueue(&self, deferred: Deferred) -> Admission {
        let mut inner = self.lock();
        if inner.in_progress {
            inner.queue.push_back(deferred);
            Admission::Queued {
                position: inner.queue.len(),
            }
        } else {
            inner.in_progress = true;
            Admission::Leader(deferred)
        }
    }

    /// Clears the flag and hands back everything queued, oldest first.
    pub(crate) fn finish(&self) -> Vec<Deferred> {
        let mut inner = self.lock();
        inner.in_progress = false;
        inner.queue.drain(..).collect()
    }

    /// `true` while a refresh call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.lock().in_progress
    }

    /// Number of requests waiting on the outstanding refresh.
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Nothing inside the critical sections can panic, so a poisoned
        // lock still holds consistent data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
