//! Graph execution: entry-to-end traversal threading message state.

use crate::error::{Result, WorkflowError};
use crate::events::Event;
use crate::graph::builder::{Route, Target};
use crate::graph::node::{Node, RunCtx};
use crate::graph::state::WorkflowState;
use crate::message::Message;
use std::collections::HashMap;
use std::sync::Arc;

/// An executable workflow graph.
///
/// Produced by [`GraphBuilder::compile`](crate::graph::GraphBuilder::compile);
/// immutable afterwards. One `invoke` call runs one traversal over a fresh
/// [`WorkflowState`]; nothing is shared between runs.
pub struct CompiledGraph {
    nodes: HashMap<String, Arc<dyn Node>>,
    routes: HashMap<String, Route>,
    entry: String,
}

impl CompiledGraph {
    pub(crate) fn new(
        nodes: HashMap<String, Arc<dyn Node>>,
        routes: HashMap<String, Route>,
        entry: String,
    ) -> Self {
        Self {
            nodes,
            routes,
            entry,
        }
    }

    /// Name of the entry node.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Run the graph from entry to end.
    ///
    /// The state is seeded from `messages`; each node's returned messages
    /// are appended before the next transition is resolved. Any node error
    /// aborts the run and propagates; the run's state is dropped.
    pub async fn invoke(&self, ctx: &RunCtx, messages: Vec<Message>) -> Result<WorkflowState> {
        let mut state = WorkflowState::new(messages);
        let mut current: &str = &self.entry;

        loop {
            let node = self
                .nodes
                .get(current)
                .ok_or_else(|| WorkflowError::InvalidGraph(format!("unknown node '{}'", current)))?;

            tracing::debug!(node = current, messages = state.messages.len(), "running node");
            ctx.emit(Event::NodeStart {
                name: current.to_string(),
            });

            match node.run(ctx, &state).await {
                Ok(update) => {
                    state.messages.extend(update);
                    ctx.emit(Event::NodeEnd {
                        name: current.to_string(),
                        ok: true,
                    });
                }
                Err(e) => {
                    ctx.emit(Event::NodeEnd {
                        name: current.to_string(),
                        ok: false,
                    });
                    return Err(e);
                }
            }

            match self.next_target(current, &state)? {
                Target::End => return Ok(state),
                Target::Node(next) => current = next.as_str(),
            }
        }
    }

    /// Resolve the transition out of `from` against the updated state.
    fn next_target<'a>(&'a self, from: &str, state: &WorkflowState) -> Result<&'a Target> {
        let route = self.routes.get(from).ok_or_else(|| {
            WorkflowError::InvalidGraph(format!("node '{}' has no outgoing edge", from))
        })?;

        match route {
            Route::Direct(target) => Ok(target),
            Route::Conditional {
                classifier,
                branches,
            } => {
                let key = classifier(state);
                tracing::debug!(node = from, key = %key, "resolving conditional edge");
                branches.get(&key).ok_or_else(|| WorkflowError::UnhandledBranch {
                    node: from.to_string(),
                    key,
                })
            }
        }
    }
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.nodes.keys().collect();
        names.sort();
        f.debug_struct("CompiledGraph")
            .field("entry", &self.entry)
            .field("nodes", &names)
            .finish()
    }
}
