//! Transport trait and normalized request/response types.
//!
//! The [`Transport`] trait abstracts over the HTTP details of a
//! chat-completions endpoint, translating between the normalized
//! [`ChatRequest`]/[`ChatResponse`] types and the wire format. Built-in
//! implementations: [`HttpTransport`] for real endpoints, [`MockTransport`]
//! for deterministic tests.
//!
//! ## Architecture
//!
//! ```text
//! ChatModel ──► ChatRequest ──► Transport::send() ──► ChatResponse
//!                                      │
//!                           ┌──────────┴──────────┐
//!                      HttpTransport         MockTransport
//!                      POST + SSE stream     canned responses
//! ```

pub mod http;
pub mod mock;
pub mod sse;

pub use http::{HttpTransport, TransportConfig};
pub use mock::MockTransport;

use crate::error::Result;
use crate::message::Message;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A lazy sequence of streamed text fragments.
///
/// Pulling the next item is the only suspension point: each poll blocks
/// until the next chunk arrives on the open connection or the stream ends.
/// The sequence is finite, single-pass, and not restartable; obtaining the
/// same fragments again requires a new [`Transport::open_stream`] call,
/// which re-sends the whole request.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A normalized chat request.
///
/// [`ChatModel`](crate::chat_model::ChatModel) builds this from its
/// configuration; the [`Transport`] translates it into the wire format.
/// The endpoint, model name, and token limit live in the transport's own
/// configuration, not here.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Ordered conversation to send.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Whether this request uses the streaming wire format.
    pub stream: bool,
}

/// A normalized chat response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The generated text content.
    pub text: String,
    /// HTTP status code (for diagnostics/logging).
    pub status: u16,
    /// The provider's finish reason, if reported.
    pub finish_reason: Option<String>,
}

/// Abstraction over chat-completions endpoints.
///
/// Implementors perform exactly one network call per invocation. There is
/// no retry, no backoff, and no caching at this layer; a transient failure
/// is surfaced directly to the caller.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a non-streaming chat call.
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Execute a streaming chat call, returning the fragment sequence.
    async fn open_stream(&self, request: &ChatRequest) -> Result<FragmentStream>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}
