//! Scripted in-memory transport for tests.
//!
//! Each `(method, path)` pair has a queue of scripted replies consumed in
//! order, plus an optional fallback used once the queue is empty. Paths
//! can be *held*: calls to a held path record themselves and then wait
//! until the test releases them, which is how tests keep a refresh call
//! in flight while other requests pile up behind it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;

use crate::{HttpResponse, Method, RequestDescriptor, RequestId, Transport, TransportError};

/// Body returned for calls nobody scripted.
const UNSCRIPTED_BODY: &str =
    r#"{"status":"fail","code":"NOT_FOUND","message":"no scripted reply"}"#;

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A response with this status and body.
    Respond { status: u16, body: Vec<u8> },
    /// No response: the call fails with a transport error.
    NetworkDown,
}

impl MockReply {
    pub fn status(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            body: body.as_bytes().to_vec(),
        }
    }
}

/// A call the transport has seen.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request_id: RequestId,
    pub method: Method,
    pub path: String,
    pub retried: bool,
    /// Status that was answered, `None` for a network failure.
    pub status: Option<u16>,
}

#[derive(Default)]
struct Script {
    replies: HashMap<(Method, String), VecDeque<MockReply>>,
    fallbacks: HashMap<(Method, String), MockReply>,
    held: HashMap<String, Arc<Notify>>,
    calls: Vec<RecordedCall>,
}

/// A [`Transport`] driven by a script instead of a network.
///
/// Clones share the same script and call log.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
    calls_changed: Arc<Notify>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a one-shot reply for `method path`.
    pub fn push(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        self.lock()
            .replies
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Shorthand for queueing a status/body reply.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.push(method, path, MockReply::status(status, body))
    }

    /// Sets the reply used whenever the queue for `method path` is empty.
    pub fn fallback(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        self.lock()
            .fallbacks
            .insert((method, path.to_string()), reply);
        self
    }

    /// Holds every call to `path` until [`release`](Self::release) is called.
    pub fn hold(&self, path: &str) {
        self.lock()
            .held
            .insert(path.to_string(), Arc::new(Notify::new()));
    }

    /// Lets one held call to `path` proceed. Later calls are no longer held.
    pub fn release(&self, path: &str) {
        if let Some(gate) = self.lock().held.remove(path) {
            gate.notify_one();
        }
    }

    /// Every call seen so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Number of calls seen for `path`, any method.
    pub fn call_count(&self, path: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.path == path).count()
    }

    /// Waits until at least `n` calls to `path` have been recorded.
    ///
    /// # Panics
    /// Panics after two seconds; a test waiting that long is deadlocked.
    pub async fn wait_for_calls(&self, path: &str, n: usize) {
        let wait = async {
            loop {
                let changed = self.calls_changed.notified();
                if self.call_count(path) >= n {
                    return;
                }
                changed.await;
            }
        };
        if tokio::time::timeout(Duration::from_secs(2), wait).await.is_err() {
            panic!("timed out waiting for {n} call(s) to {path}");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, request: &RequestDescriptor, status: Option<u16>) {
        self.lock().calls.push(RecordedCall {
            request_id: request.id(),
            method: request.method(),
            path: request.path().to_string(),
            retried: request.is_retried(),
            status,
        });
        self.calls_changed.notify_waiters();
    }

    fn next_reply(&self, request: &RequestDescriptor) -> MockReply {
        let key = (request.method(), request.path().to_string());
        let mut script = self.lock();
        if let Some(reply) = script.replies.get_mut(&key).and_then(VecDeque::pop_front) {
            return reply;
        }
        script
            .fallbacks
            .get(&key)
            .cloned()
            .unwrap_or_else(|| MockReply::status(404, UNSCRIPTED_BODY))
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        let gate = self.lock().held.get(request.path()).cloned();
        let reply = self.next_reply(request);

        // Recorded before parking so tests can observe a held call in flight.
        self.record(request, reply_status(&reply));
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match reply {
            MockReply::Respond { status, body } => Ok(HttpResponse { status, body }),
            MockReply::NetworkDown => Err(TransportError::ConnectionClosed(
                "scripted network failure".into(),
            )),
        }
    }
}

fn reply_status(reply: &MockReply) -> Option<u16> {
    match reply {
        MockReply::Respond { status, .. } => Some(*status),
        MockReply::NetworkDown => None,
    }
}
