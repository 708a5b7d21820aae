//! Nullable backend: record requests without sending them.

use async_trait::async_trait;
use attest_submit::{Backend, BackendRequest, TransportError};
use serde_json::Value;
use std::sync::Mutex;

/// A test backend that records every request and answers from a queue of
/// canned replies. The last reply repeats.
pub struct NullBackend {
    sent: Mutex<Vec<BackendRequest>>,
    replies: Mutex<Vec<Result<Value, TransportError>>>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `body`.
    pub fn replying(body: Value) -> Self {
        let backend = Self::new();
        backend.enqueue(Ok(body));
        backend
    }

    /// Always fail below HTTP.
    pub fn unreachable() -> Self {
        let backend = Self::new();
        backend.enqueue(Err(TransportError::Unreachable("connection refused".into())));
        backend
    }

    pub fn enqueue(&self, reply: Result<Value, TransportError>) {
        self.replies.lock().unwrap().push(reply);
    }

    /// Get all sent requests (for assertions).
    pub fn sent(&self) -> Vec<BackendRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// Clear all state.
    pub fn reset(&self) {
        self.sent.lock().unwrap().clear();
        self.replies.lock().unwrap().clear();
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for NullBackend {
    async fn post_json(&self, request: BackendRequest) -> Result<Value, TransportError> {
        self.sent.lock().unwrap().push(request);
        let mut replies = self.replies.lock().unwrap();
        match replies.len() {
            0 => Err(TransportError::Unreachable("no reply configured".into())),
            1 => replies[0].clone(),
            _ => replies.remove(0),
        }
    }
}
