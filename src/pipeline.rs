//! Prompt-to-text pipeline.
//!
//! [`PromptPipeline`] chains three stages into one invocable unit: render a
//! system prompt plus a templated user message, call the [`ChatModel`], and
//! extract the assistant's text. No branching, no retries; any stage
//! failure propagates unchanged to the caller.

use crate::chat_model::ChatModel;
use crate::error::Result;
use crate::message::Message;
use crate::prompt::{render, PromptVars};
use crate::transport::FragmentStream;
use futures::StreamExt;

/// A prompt template, model call, and text extraction composed into one
/// invocable unit.
///
/// A pipeline is a pure function of its input vars and the facade's fixed
/// configuration; no state is carried between invocations.
///
/// # Example
///
/// ```no_run
/// use llm_workflow::chat_model::ChatModel;
/// use llm_workflow::pipeline::PromptPipeline;
/// use llm_workflow::prompt::PromptVars;
/// use llm_workflow::transport::{HttpTransport, TransportConfig};
/// use std::sync::Arc;
///
/// # async fn demo() -> llm_workflow::Result<()> {
/// let model = ChatModel::new(Arc::new(HttpTransport::new(
///     TransportConfig::new("http://localhost:31111/v1/chat/completions", "qwen3-235b"),
/// )));
///
/// let translate = PromptPipeline::new(
///     model,
///     "You are a professional translation assistant. Translate the user's text into English.",
///     "{text}",
/// );
///
/// let vars = PromptVars::new().insert("text", "Bonjour le monde");
/// let english = translate.invoke(&vars).await?;
/// println!("{}", english);
/// # Ok(())
/// # }
/// ```
pub struct PromptPipeline {
    system_template: String,
    user_template: String,
    model: ChatModel,
}

impl PromptPipeline {
    /// Create a pipeline from a fixed system prompt and a user template.
    pub fn new(
        model: ChatModel,
        system_template: impl Into<String>,
        user_template: impl Into<String>,
    ) -> Self {
        Self {
            system_template: system_template.into(),
            user_template: user_template.into(),
            model,
        }
    }

    fn render_messages(&self, vars: &PromptVars) -> Vec<Message> {
        vec![
            Message::system(render(&self.system_template, vars)),
            Message::user(render(&self.user_template, vars)),
        ]
    }

    /// Run the pipeline and return the assistant's text.
    pub async fn invoke(&self, vars: &PromptVars) -> Result<String> {
        let messages = self.render_messages(vars);
        let reply = self.model.generate(&messages).await?;
        Ok(reply.content)
    }

    /// Run the pipeline, streaming the assistant's text as fragments.
    pub async fn stream(&self, vars: &PromptVars) -> Result<FragmentStream> {
        let messages = self.render_messages(vars);
        let parts = self.model.stream(&messages).await?;
        Ok(Box::pin(parts.map(|r| r.map(|m| m.content))))
    }
}
