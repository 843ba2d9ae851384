//! Chat model facade over a [`Transport`].
//!
//! [`ChatModel`] hides the wire details behind a uniform generate/stream
//! contract: structured [`Message`] values in, a single assistant message
//! (or a lazy sequence of partial assistant messages) out.

use crate::error::Result;
use crate::message::Message;
use crate::transport::{ChatRequest, FragmentStream, Transport};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

/// A lazy sequence of partial assistant messages from a streaming call.
///
/// Same single-pass, non-restartable contract as [`FragmentStream`].
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// Uniform generate/stream interface over a chat-completions transport.
///
/// The facade holds the per-instance sampling temperature (default 0.7);
/// endpoint, model name, token limit, and credentials belong to the
/// transport's configuration.
///
/// # Example
///
/// ```no_run
/// use llm_workflow::chat_model::ChatModel;
/// use llm_workflow::message::Message;
/// use llm_workflow::transport::{HttpTransport, TransportConfig};
/// use std::sync::Arc;
///
/// # async fn demo() -> llm_workflow::Result<()> {
/// let transport = HttpTransport::new(
///     TransportConfig::new("http://localhost:31111/v1/chat/completions", "qwen3-235b")
///         .with_api_key("sk-..."),
/// );
/// let model = ChatModel::new(Arc::new(transport));
///
/// let reply = model
///     .generate(&[Message::user("Hello, world!")])
///     .await?;
/// println!("{}", reply.content);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChatModel {
    transport: Arc<dyn Transport>,
    temperature: f64,
}

impl ChatModel {
    /// Create a facade over the given transport with temperature 0.7.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            temperature: 0.7,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the configured temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    fn build_request(&self, messages: &[Message], stream: bool) -> ChatRequest {
        ChatRequest {
            messages: messages.to_vec(),
            temperature: self.temperature,
            stream,
        }
    }

    /// Generate a single assistant reply to the conversation.
    ///
    /// Blocks until the transport returns. Total: yields exactly one
    /// assistant [`Message`] or one error, never both.
    pub async fn generate(&self, messages: &[Message]) -> Result<Message> {
        let request = self.build_request(messages, false);
        let response = self.transport.send(&request).await?;
        Ok(Message::assistant(response.text))
    }

    /// Stream an assistant reply as partial messages.
    ///
    /// Fragments are forwarded directly from the transport, each wrapped
    /// as a partial assistant message; the facade does no buffering or
    /// concatenation. Callers that need the full text accumulate the
    /// fragments themselves.
    pub async fn stream(&self, messages: &[Message]) -> Result<MessageStream> {
        let request = self.build_request(messages, true);
        let fragments: FragmentStream = self.transport.open_stream(&request).await?;
        Ok(Box::pin(
            fragments.map(|r| r.map(Message::assistant)),
        ))
    }
}

impl std::fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("transport", &self.transport.name())
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::transport::MockTransport;

    #[test]
    fn test_default_temperature() {
        let model = ChatModel::new(Arc::new(MockTransport::fixed("x")));
        assert!((model.temperature() - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_generate_wraps_assistant_message() {
        let model = ChatModel::new(Arc::new(MockTransport::fixed("a reply")));
        let reply = model.generate(&[Message::user("hi")]).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "a reply");
    }

    #[tokio::test]
    async fn test_generate_passes_messages_and_temperature() {
        let mock = Arc::new(MockTransport::fixed("ok"));
        let model = ChatModel::new(mock.clone()).with_temperature(0.2);
        let messages = vec![Message::system("sys"), Message::user("ask")];
        model.generate(&messages).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].messages, messages);
        assert!((calls[0].temperature - 0.2).abs() < f64::EPSILON);
        assert!(!calls[0].stream);
    }

    #[tokio::test]
    async fn test_stream_yields_partial_assistant_messages() {
        let model = ChatModel::new(Arc::new(MockTransport::fixed("one two three")));
        let mut stream = model.stream(&[Message::user("go")]).await.unwrap();

        let mut fragments = Vec::new();
        while let Some(part) = stream.next().await {
            let part = part.unwrap();
            assert_eq!(part.role, Role::Assistant);
            fragments.push(part.content);
        }
        assert!(fragments.len() > 1);
        assert_eq!(fragments.concat(), "one two three");
    }

    #[tokio::test]
    async fn test_stream_concatenation_matches_generate() {
        let text = "deterministic output from the endpoint";
        let generate_model = ChatModel::new(Arc::new(MockTransport::fixed(text)));
        let stream_model = ChatModel::new(Arc::new(MockTransport::fixed(text)));
        let input = [Message::user("same input")];

        let full = generate_model.generate(&input).await.unwrap();

        let mut stream = stream_model.stream(&input).await.unwrap();
        let mut accumulated = String::new();
        while let Some(part) = stream.next().await {
            accumulated.push_str(&part.unwrap().content);
        }

        assert_eq!(accumulated, full.content);
    }

    #[tokio::test]
    async fn test_stream_request_marked_streaming() {
        let mock = Arc::new(MockTransport::fixed("x"));
        let model = ChatModel::new(mock.clone());
        let _ = model.stream(&[Message::user("go")]).await.unwrap();
        assert!(mock.calls()[0].stream);
    }
}
