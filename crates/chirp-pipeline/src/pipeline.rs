//! The request pipeline: dispatch plus transparent session recovery.
//!
//! On a 401 the pipeline runs the recovery algorithm:
//!
//! 1. A 401 from the refresh endpoint itself is terminal: hard reset,
//!    fail with `SessionExpired`, never queue.
//! 2. A descriptor that was already retried fails with its 401.
//! 3. Otherwise it is marked retried and either claims the refresh
//!    (first one in) or joins the queue behind the refresh in flight.
//!
//! The refresh, the replays and the reissue of the original request all
//! run on one spawned task. Callers only await their own reply channel,
//! so a caller that gives up cannot strand the requests queued behind it.

use std::sync::Arc;

use chirp_protocol::endpoints;
use chirp_transport::{HttpResponse, RequestDescriptor, Transport};
use tokio::sync::oneshot;

use crate::refresh::{Admission, Deferred};
use crate::{ApiError, RefreshState, Refresher, SessionHooks, classify};

/// Shared pipeline state. One per client instance.
struct PipelineInner<T, R> {
    transport: T,
    refresher: R,
    hooks: Arc<dyn SessionHooks>,
    refresh: RefreshState,
}

/// Handle to the request pipeline.
///
/// Cheap to clone; every clone shares the same transport, refresh state
/// and hooks.
pub struct RequestPipeline<T, R> {
    inner: Arc<PipelineInner<T, R>>,
}

impl<T, R> Clone for RequestPipeline<T, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport, R: Refresher> RequestPipeline<T, R> {
    /// Builds a pipeline over `transport`, renewing sessions with
    /// `refresher` and reporting outcomes to `hooks`.
    pub fn new(transport: T, refresher: R, hooks: Arc<dyn SessionHooks>) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                transport,
                refresher,
                hooks,
                refresh: RefreshState::new(),
            }),
        }
    }

    /// Issues a request, recovering from session expiry if needed.
    ///
    /// # Errors
    /// - [`ApiError::Client`] / [`ApiError::Server`] / [`ApiError::Network`]
    ///   pass through unchanged.
    /// - [`ApiError::SessionExpired`] only when recovery is exhausted or
    ///   disallowed.
    /// - The refresh error itself when the refresh fails.
    pub async fn execute(&self, mut request: RequestDescriptor) -> Result<HttpResponse, ApiError> {
        let expired = match self.inner.attempt(&request).await {
            Err(err) if err.is_session_expired() => err,
            other => return other,
        };

        if request.targets(endpoints::REFRESH) {
            tracing::warn!(
                request_id = %request.id(),
                "refresh endpoint rejected the session; resetting"
            );
            self.inner.hooks.hard_reset();
            return Err(expired);
        }

        if !request.mark_retried() {
            tracing::debug!(
                request_id = %request.id(),
                path = request.path(),
                "session expired again after retry; giving up"
            );
            return Err(expired);
        }

        let (reply, outcome) = oneshot::channel();
        match self.inner.refresh.begin_or_enqueue(Deferred { request, reply }) {
            Admission::Leader(original) => {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(run_recovery(inner, original));
            }
            Admission::Queued { position } => {
                tracing::debug!(position, "queued behind in-flight session refresh");
            }
        }

        outcome.await.map_err(|_| {
            ApiError::Network("request dropped before the session refresh settled".into())
        })?
    }

    /// `true` while a refresh call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Requests currently parked behind the outstanding refresh.
    pub fn queued_requests(&self) -> usize {
        self.inner.refresh.queued()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }
}

impl<T: Transport, R: Refresher> PipelineInner<T, R> {
    /// One round trip, classified. No recovery.
    async fn attempt(&self, request: &RequestDescriptor) -> Result<HttpResponse, ApiError> {
        let result = match self.transport.send(request).await {
            Ok(response) => classify(response),
            Err(err) => Err(ApiError::from(err)),
        };

        match &result {
            Ok(response) => tracing::debug!(
                request_id = %request.id(),
                method = %request.method(),
                path = request.path(),
                status = response.status,
                "request completed"
            ),
            Err(err) => tracing::debug!(
                request_id = %request.id(),
                method = %request.method(),
                path = request.path(),
                status = ?err.status(),
                error = %err,
                "request failed"
            ),
        }

        result
    }
}

/// Refreshes the session, then settles every parked request.
///
/// On success the queue is replayed one request at a time in arrival
/// order, and the request that started the refresh is reissued last.
/// On failure every parked request gets the refresh error and the hard
/// reset fires exactly once.
async fn run_recovery<T: Transport, R: Refresher>(
    inner: Arc<PipelineInner<T, R>>,
    original: Deferred,
) {
    tracing::info!(request_id = %original.request.id(), "session expired; refreshing");

    inner.hooks.refresh_started();
    let outcome = inner.refresher.refresh().await;
    let queued = inner.refresh.finish();

    match outcome {
        Ok(user) => {
            tracing::info!(user = %user.id, replays = queued.len(), "session refreshed");
            inner.hooks.session_renewed(&user);

            for deferred in queued {
                let result = inner.attempt(&deferred.request).await;
                // The caller may have stopped waiting; that's fine.
                let _ = deferred.reply.send(result);
            }

            let result = inner.attempt(&original.request).await;
            let _ = original.reply.send(result);
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                failed = queued.len() + 1,
                "session refresh failed; resetting session"
            );

            for deferred in queued {
                let _ = deferred.reply.send(Err(err.clone()));
            }
            inner.hooks.hard_reset();
            let _ = original.reply.send(Err(err));
        }
    }
}
