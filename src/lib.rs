//! # LLM Workflow
//!
//! Message-graph workflows over chat-completions APIs.
//!
//! This crate provides the building blocks for small LLM workflows: a
//! **transport** that speaks the chat-completions wire format (including
//! SSE streaming), a **chat model facade** with a uniform generate/stream
//! contract, a **prompt pipeline** for one-shot template-to-text calls,
//! and a **workflow graph** that walks named nodes from an entry point to
//! an end marker, threading an accumulating message list as state.
//!
//! ## Core Concepts
//!
//! - **[`Message`]** / **[`Role`]**: an ordered conversation of immutable
//!   role-tagged messages.
//! - **[`Transport`]**: object-safe seam over the HTTP endpoint; one
//!   network call per invocation, no retry, no caching. [`HttpTransport`]
//!   for real endpoints, [`MockTransport`] for tests.
//! - **[`ChatModel`]**: `generate` returns one assistant message;
//!   `stream` returns a lazy, single-pass sequence of partial messages.
//! - **[`PromptPipeline`]**: prompt template, model call, and text
//!   extraction composed into one invocable unit.
//! - **[`GraphBuilder`]** / **[`CompiledGraph`]**: declare nodes and
//!   edges (including classifier-gated conditional branches), validate
//!   at compile time (acyclic only), execute entry to end.
//! - **[`workflows`]**: ready-made graphs for conversation, generate then
//!   summarize, and classify-and-route.
//!
//! ## Quick Start
//!
//! ```no_run
//! use llm_workflow::chat_model::ChatModel;
//! use llm_workflow::message::Message;
//! use llm_workflow::transport::{HttpTransport, TransportConfig};
//! use llm_workflow::workflows::DecisionWorkflow;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(
//!         TransportConfig::new(
//!             "http://localhost:31111/api/inference/v1/chat/completions",
//!             "qwen3-235b",
//!         )
//!         .with_api_key(std::env::var("API_KEY")?),
//!     );
//!     let model = ChatModel::new(Arc::new(transport));
//!
//!     let workflow = DecisionWorkflow::new(model)?;
//!     let state = workflow.run("translate: bonjour le monde").await?;
//!     println!("{}", state.last_content().unwrap_or_default());
//!     Ok(())
//! }
//! ```

pub mod chat_model;
pub mod error;
pub mod events;
pub mod graph;
pub mod message;
pub mod pipeline;
pub mod prompt;
pub mod transport;
pub mod workflows;

pub use chat_model::{ChatModel, MessageStream};
pub use error::{Result, WorkflowError};
pub use events::{Event, EventHandler, FnEventHandler};
pub use graph::{
    ChatNode, CompiledGraph, GraphBuilder, Node, RunCtx, Target, WorkflowState,
};
pub use message::{Message, Role};
pub use pipeline::PromptPipeline;
pub use prompt::PromptVars;
pub use transport::{
    ChatRequest, ChatResponse, FragmentStream, HttpTransport, MockTransport, Transport,
    TransportConfig,
};
pub use workflows::{ConversationWorkflow, DecisionWorkflow, Intent, SimpleWorkflow};
