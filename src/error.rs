use thiserror::Error;

/// Errors produced by the workflow core and its components.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    Transport {
        /// HTTP status code (e.g. 401, 429, 500).
        status: u16,
        /// Response body text.
        body: String,
    },

    /// A non-streaming response body could not be decoded into chat content.
    #[error("failed to decode chat response: {0}")]
    Decode(String),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A message carried a role outside system/user/assistant.
    #[error("unrecognized message role: {0:?}")]
    InvalidRole(String),

    /// A classifier produced a key with no matching branch.
    #[error("node '{node}' routed to unhandled branch key {key:?}")]
    UnhandledBranch { node: String, key: String },

    /// The graph failed validation at compile time.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for WorkflowError {
    fn from(err: anyhow::Error) -> Self {
        WorkflowError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
