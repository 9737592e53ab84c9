use std::time::Duration;

use thiserror::Error;

/// Errors that can occur talking to the tool server.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("failed to list tools: {0}")]
    Listing(String),
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("tool {name} timed out after {after:?}")]
    Timeout { name: String, after: Duration },
    #[error("execution failed: {0}")]
    Execution(String),
    /// The server ran the tool and flagged the result as an error.
    #[error("tool reported an error: {0}")]
    Reported(String),
}
