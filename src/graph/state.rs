//! Per-run workflow state.

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// The accumulating state threaded through one graph execution.
///
/// Each `invoke` call gets a fresh state seeded from caller input; the
/// state is owned exclusively by that run and dropped when it ends.
/// Nodes return new messages to append; existing messages are never
/// mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Ordered conversation accumulated so far.
    pub messages: Vec<Message>,
}

impl WorkflowState {
    /// Create a state seeded with the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Content of the first message, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.messages.first().map(|m| m.content.as_str())
    }

    /// Content of the most recent message, if any.
    pub fn last_content(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }

    /// All message contents joined with newlines.
    pub fn joined_contents(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
