//! Workflow graph: named nodes, edges, and a message-threading executor.
//!
//! A graph is declared with [`GraphBuilder`] (nodes, an entry point, plain
//! and conditional edges), validated and frozen by
//! [`GraphBuilder::compile`], and executed by [`CompiledGraph::invoke`].
//! Execution walks from the entry node to the [`Target::End`] marker,
//! threading an accumulating message list as state. Graphs are acyclic;
//! cycles are rejected at compile time.

pub mod builder;
pub mod executor;
pub mod node;
pub mod state;

pub use builder::{ClassifierFn, GraphBuilder, Target};
pub use executor::CompiledGraph;
pub use node::{BoxFut, ChatNode, Node, PrepareFn, RunCtx};
pub use state::WorkflowState;
