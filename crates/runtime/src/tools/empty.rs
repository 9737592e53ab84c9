//! Empty tool host implementation.

use crate::schema::ToolDescriptor;
use crate::tools::{ToolContent, ToolError, ToolExecutor};
use serde_json::{Map, Value};

/// A tool host with no tools.
///
/// Every call fails with [`ToolError::NotFound`].
#[derive(Debug, Default)]
pub struct EmptyToolHost;

impl ToolExecutor for EmptyToolHost {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolError> {
        Ok(Vec::new())
    }

    async fn call_tool(
        &self,
        name: &str,
        _arguments: &Map<String, Value>,
    ) -> Result<Vec<ToolContent>, ToolError> {
        Err(ToolError::NotFound(name.to_string()))
    }
}
