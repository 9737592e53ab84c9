//! MCP client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid launch target: {0}")]
    InvalidTarget(String),

    #[error("failed to spawn server: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to initialize server: {0}")]
    Initialize(String),

    #[error("failed to list tools: {0}")]
    ListTools(String),

    #[error("tool call failed: {0}")]
    CallTool(String),

    #[error("tool reported an error: {0}")]
    ToolFailed(String),

    #[error("shutdown failed: {0}")]
    Shutdown(String),
}

pub type Result<T> = std::result::Result<T, Error>;
