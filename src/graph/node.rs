//! Node trait and the chat-calling node implementation.
//!
//! Nodes are the unit of work in a graph. Each node reads the current
//! [`WorkflowState`] and returns a partial update: a list of new messages
//! the executor appends to the state. The trait is object-safe so nodes
//! can be stored as `Arc<dyn Node>` without generic constraints.

use crate::chat_model::ChatModel;
use crate::error::Result;
use crate::events::{Event, EventHandler};
use crate::graph::state::WorkflowState;
use crate::message::Message;
use futures::StreamExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, pinned, Send future: the return type of [`Node::run`].
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Per-run execution options shared with every node.
#[derive(Default)]
pub struct RunCtx {
    /// Optional handler for node lifecycle and fragment events.
    pub event_handler: Option<Arc<dyn EventHandler>>,
    /// When set, nodes stream their model calls and surface fragments
    /// through the event handler as they arrive.
    pub streaming: bool,
}

impl RunCtx {
    /// Context for a plain, non-streaming run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a streaming run with the given handler.
    pub fn streaming(handler: Arc<dyn EventHandler>) -> Self {
        Self {
            event_handler: Some(handler),
            streaming: true,
        }
    }

    /// Deliver an event to the handler, if one is attached.
    pub fn emit(&self, event: Event) {
        if let Some(ref handler) = self.event_handler {
            handler.on_event(event);
        }
    }
}

/// A named unit of work in a workflow graph.
pub trait Node: Send + Sync {
    /// Unique node name within its graph.
    fn name(&self) -> &str;

    /// Execute the node against the current state.
    ///
    /// Returns the messages to append. Errors abort the whole run.
    fn run<'a>(&'a self, ctx: &'a RunCtx, state: &'a WorkflowState)
        -> BoxFut<'a, Result<Vec<Message>>>;
}

/// Builds the conversation a [`ChatNode`] sends from the current state.
pub type PrepareFn = Arc<dyn Fn(&WorkflowState) -> Vec<Message> + Send + Sync>;

/// A node that prepares a conversation from the state and calls the model.
///
/// In a streaming run the model call streams; each fragment is surfaced as
/// an [`Event::Fragment`] tagged with this node's name, and the
/// accumulated text becomes the message appended to the state.
///
/// # Example
///
/// ```
/// use llm_workflow::chat_model::ChatModel;
/// use llm_workflow::graph::ChatNode;
/// use llm_workflow::transport::MockTransport;
/// use std::sync::Arc;
///
/// let model = ChatModel::new(Arc::new(MockTransport::fixed("hi")));
/// let node = ChatNode::new("chat", model, |state| state.messages.clone());
/// ```
pub struct ChatNode {
    name: String,
    model: ChatModel,
    prepare: PrepareFn,
}

impl ChatNode {
    /// Create a node that sends `prepare(state)` to the model.
    pub fn new<F>(name: impl Into<String>, model: ChatModel, prepare: F) -> Self
    where
        F: Fn(&WorkflowState) -> Vec<Message> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            model,
            prepare: Arc::new(prepare),
        }
    }
}

impl Node for ChatNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn run<'a>(
        &'a self,
        ctx: &'a RunCtx,
        state: &'a WorkflowState,
    ) -> BoxFut<'a, Result<Vec<Message>>> {
        Box::pin(async move {
            let conversation = (self.prepare)(state);

            let reply = if ctx.streaming {
                let mut parts = self.model.stream(&conversation).await?;
                let mut accumulated = String::new();
                while let Some(part) = parts.next().await {
                    let part = part?;
                    ctx.emit(Event::Fragment {
                        node: self.name.clone(),
                        chunk: part.content.clone(),
                    });
                    accumulated.push_str(&part.content);
                }
                Message::assistant(accumulated)
            } else {
                self.model.generate(&conversation).await?
            };

            Ok(vec![reply])
        })
    }
}
