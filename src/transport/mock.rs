//! Mock transport for testing without a live endpoint.
//!
//! [`MockTransport`] returns pre-configured responses in order, or computes
//! them from the request, allowing downstream consumers to write
//! deterministic tests against this crate. Every request is recorded so
//! tests can assert call counts and ordering.
//!
//! # Example
//!
//! ```
//! use llm_workflow::transport::MockTransport;
//!
//! let mock = MockTransport::new(vec!["Hello, world!".to_string()]);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use super::{ChatRequest, ChatResponse, FragmentStream, Transport};
use crate::error::Result;

type Responder = Box<dyn Fn(&ChatRequest) -> String + Send + Sync>;

/// A test transport that returns canned responses in order.
///
/// Cycles back to the beginning when all responses have been consumed.
/// For streaming, the response text is split into word fragments so that
/// concatenating the fragments reproduces the non-streaming text exactly.
pub struct MockTransport {
    responses: Vec<String>,
    responder: Option<Responder>,
    index: AtomicUsize,
    calls: Mutex<Vec<ChatRequest>>,
}

impl MockTransport {
    /// Create a mock with the given canned responses.
    ///
    /// Responses are returned in order. When exhausted, cycles from the
    /// beginning.
    pub fn new(responses: Vec<String>) -> Self {
        assert!(
            !responses.is_empty(),
            "MockTransport requires at least one response"
        );
        Self {
            responses,
            responder: None,
            index: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Create a mock whose response is computed from each request.
    pub fn respond_with<F>(responder: F) -> Self
    where
        F: Fn(&ChatRequest) -> String + Send + Sync + 'static,
    {
        Self {
            responses: Vec::new(),
            responder: Some(Box::new(responder)),
            index: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock call log poisoned").len()
    }

    fn next_response(&self, request: &ChatRequest) -> String {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .push(request.clone());
        if let Some(ref responder) = self.responder {
            return responder(request);
        }
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.responses.len();
        self.responses[idx].clone()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("responses", &self.responses)
            .field("has_responder", &self.responder.is_some())
            .field("call_count", &self.call_count())
            .finish()
    }
}

/// Split text into fragments at word boundaries, keeping separators.
fn split_fragments(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(|s| s.to_string()).collect()
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let text = self.next_response(request);
        Ok(ChatResponse {
            text,
            status: 200,
            finish_reason: Some("stop".to_string()),
        })
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<FragmentStream> {
        let text = self.next_response(request);
        let fragments: Vec<Result<String>> =
            split_fragments(&text).into_iter().map(Ok).collect();
        Ok(Box::pin(stream::iter(fragments)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
