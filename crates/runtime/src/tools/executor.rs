//! Tool executor trait.

use crate::schema::ToolDescriptor;
use crate::tools::{ToolContent, ToolError};
use serde_json::{Map, Value};
use std::future::Future;

/// Trait for tool execution hosts.
///
/// Implementations list the tools a server offers and invoke them by name.
/// This is the boundary between the call orchestrator and side effects.
pub trait ToolExecutor: Send + Sync {
    /// List every tool the server offers, in server order.
    fn list_tools(&self) -> impl Future<Output = Result<Vec<ToolDescriptor>, ToolError>> + Send;

    /// Invoke a tool by name.
    fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> impl Future<Output = Result<Vec<ToolContent>, ToolError>> + Send;
}
