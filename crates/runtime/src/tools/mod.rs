//! Tool execution and the tool registry cache.

mod empty;
pub mod errors;
mod executor;
mod mcp_host;
mod registry;
mod types;

pub use empty::EmptyToolHost;
pub use errors::ToolError;
pub use executor::ToolExecutor;
pub use mcp_host::McpToolHost;
pub use registry::ToolRegistry;
pub use types::{ToolContent, join_text};
