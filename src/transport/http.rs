//! HTTP transport for chat-completions endpoints.
//!
//! [`HttpTransport`] issues one `POST` per call with a JSON body
//! `{model, messages, temperature, max_tokens, stream}` and a bearer-token
//! header when a key is configured. Non-streaming responses are decoded
//! from `choices[0].message.content`; streaming responses are consumed as
//! SSE `data:` events carrying `choices[0].delta.content`.

use super::sse::SseDecoder;
use super::{ChatRequest, ChatResponse, FragmentStream, Transport};
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Configuration for an [`HttpTransport`].
///
/// All connection details are threaded through this value; nothing is read
/// from process-wide state.
///
/// # Example
///
/// ```
/// use llm_workflow::transport::TransportConfig;
///
/// let config = TransportConfig::new(
///     "http://localhost:31111/api/inference/v1/chat/completions",
///     "qwen3-235b",
/// )
/// .with_api_key("sk-...")
/// .with_max_tokens(4096);
/// ```
#[derive(Clone)]
pub struct TransportConfig {
    /// Full URL of the chat-completions endpoint.
    pub endpoint: String,
    /// Model identifier sent in the request body.
    pub model: String,
    /// Maximum tokens to generate. Default: 2048.
    pub max_tokens: u32,
    /// Optional API key. If set, sent as `Authorization: Bearer {key}`.
    /// A missing key is not validated locally; the provider's 401 surfaces
    /// as a [`WorkflowError::Transport`].
    pub api_key: Option<String>,
    /// Request timeout, applied to streaming and non-streaming calls alike.
    /// Default: 60 seconds.
    pub timeout: Duration,
}

impl TransportConfig {
    /// Create a config for the given endpoint and model with defaults.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            max_tokens: 2048,
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the API key for bearer-token authentication.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|k| {
                    if k.len() > 6 {
                        format!("{}***", &k[..6])
                    } else {
                        "***".to_string()
                    }
                }),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Transport for chat-completions endpoints.
///
/// Performs exactly one network call per invocation. The configured timeout
/// bounds both call paths; in streaming mode it covers the time until the
/// response body has been fully read.
#[derive(Debug)]
pub struct HttpTransport {
    config: TransportConfig,
    client: Client,
}

impl HttpTransport {
    /// Create a transport from a config, building its own HTTP client.
    pub fn new(config: TransportConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self { config, client }
    }

    /// Returns the transport's configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Build the JSON request body.
    fn build_body(&self, request: &ChatRequest) -> Value {
        json!({
            "model": self.config.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": request.stream,
        })
    }

    /// Build the reqwest request with appropriate headers.
    fn build_http_request(&self, body: &Value) -> reqwest::RequestBuilder {
        let mut req = self.client.post(&self.config.endpoint).json(body);
        if let Some(ref key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }
        req
    }

    /// Extract content and finish reason from a non-streaming response body.
    fn parse_completion(value: &Value) -> Result<(String, Option<String>)> {
        let choice = value
            .get("choices")
            .and_then(|c| c.get(0))
            .ok_or_else(|| WorkflowError::Decode("missing choices[0]".into()))?;

        let text = choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                WorkflowError::Decode("missing choices[0].message.content".into())
            })?
            .to_string();

        let finish_reason = choice
            .get("finish_reason")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok((text, finish_reason))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let body = self.build_body(request);
        tracing::debug!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let resp = self.build_http_request(&body).send().await?;
        let status = resp.status().as_u16();

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "chat completion request failed");
            return Err(WorkflowError::Transport { status, body: text });
        }

        let text = resp.text().await?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| WorkflowError::Decode(format!("invalid JSON body: {}", e)))?;
        let (content, finish_reason) = Self::parse_completion(&value)?;

        Ok(ChatResponse {
            text: content,
            status,
            finish_reason,
        })
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<FragmentStream> {
        let mut streamed = request.clone();
        streamed.stream = true;
        let body = self.build_body(&streamed);
        tracing::debug!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            messages = request.messages.len(),
            "opening chat completion stream"
        );

        let resp = self.build_http_request(&body).send().await?;
        let status = resp.status().as_u16();

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "chat completion stream request failed");
            return Err(WorkflowError::Transport { status, body: text });
        }

        let inner = resp.bytes_stream().map(|r| r.map(|b| b.to_vec()));
        Ok(Box::pin(SseStream::new(inner)))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Extract `choices[0].delta.content` from a streamed event, if present
/// and non-empty.
fn delta_content(value: &Value) -> Option<String> {
    value
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Pull-based fragment stream over an SSE response body.
///
/// Single-pass and not restartable: once exhausted, a new call is required
/// to obtain fragments again. The `[DONE]` terminator ends the sequence;
/// any bytes after it are never decoded.
struct SseStream<S> {
    inner: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    done: bool,
}

impl<S> SseStream<S>
where
    S: Stream<Item = reqwest::Result<Vec<u8>>> + Send,
{
    fn new(inner: S) -> Self {
        Self {
            inner: Box::pin(inner),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }
}

impl<S> Stream for SseStream<S>
where
    S: Stream<Item = reqwest::Result<Vec<u8>>> + Send,
{
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // All fields are Unpin (the inner stream is boxed).
        let this = self.get_mut();
        loop {
            if let Some(fragment) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(fragment)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    for value in this.decoder.feed(&chunk) {
                        if let Some(content) = delta_content(&value) {
                            this.pending.push_back(content);
                        }
                    }
                    if this.decoder.is_done() {
                        this.done = true;
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e.into())));
                }
                Poll::Ready(None) => {
                    for value in this.decoder.finish() {
                        if let Some(content) = delta_content(&value) {
                            this.pending.push_back(content);
                        }
                    }
                    this.done = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
