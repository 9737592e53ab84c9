//! MCP-backed tool host.

use super::{ToolContent, ToolError, ToolExecutor};
use crate::schema::ToolDescriptor;
use mcp::{Client, Content, LaunchTarget, RawContent};
use serde_json::{Map, Value};
use tracing::debug;

/// Tool host backed by an MCP server process.
pub struct McpToolHost {
    client: Client,
}

impl McpToolHost {
    /// Spawn the MCP server and connect to it.
    pub async fn spawn(target: LaunchTarget) -> mcp::Result<Self> {
        let client = Client::spawn(target).await?;
        Ok(Self { client })
    }

    /// Close the session and terminate the server process.
    pub async fn shutdown(self) -> mcp::Result<()> {
        self.client.shutdown().await
    }
}

impl ToolExecutor for McpToolHost {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolError> {
        let tools = self
            .client
            .list_tools()
            .await
            .map_err(|e| ToolError::Listing(e.to_string()))?;

        Ok(tools
            .iter()
            .map(|tool| {
                ToolDescriptor::from_input_schema(
                    tool.name.to_string(),
                    tool.description.as_deref().unwrap_or_default(),
                    &tool.input_schema,
                )
            })
            .collect())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<Vec<ToolContent>, ToolError> {
        debug!(tool = name, "dispatching to MCP server");
        let result = self
            .client
            .call_tool(name, Some(arguments.clone()))
            .await
            .map_err(call_error)?;

        Ok(result.content.iter().map(content_of).collect())
    }
}

fn call_error(error: mcp::Error) -> ToolError {
    match error {
        mcp::Error::ToolFailed(message) => ToolError::Reported(message),
        other => ToolError::Execution(other.to_string()),
    }
}

fn content_of(content: &Content) -> ToolContent {
    let kind = match &content.raw {
        RawContent::Text(text) => return ToolContent::Text(text.text.clone()),
        RawContent::Image(_) => "image",
        RawContent::Audio(_) => "audio",
        RawContent::Resource(_) => "resource",
        _ => "unknown",
    };
    ToolContent::Other(kind.to_string())
}
