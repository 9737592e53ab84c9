//! MCP client session over a child process.

use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParams, CallToolResult, RawContent, RawTextContent, Tool},
    service::RunningService,
    transport::{ConfigureCommandExt, TokioChildProcess},
};
use serde_json::{Map, Value};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::launch::LaunchTarget;

/// An MCP client connected to a server process.
///
/// The server process is killed when the client is dropped.
pub struct Client {
    target: LaunchTarget,
    service: RunningService<RoleClient, ()>,
}

impl Client {
    /// Spawn the server described by `target` and perform the handshake.
    pub async fn spawn(target: LaunchTarget) -> Result<Self> {
        let transport = TokioChildProcess::new(Command::new(&target.command).configure(|cmd| {
            cmd.args(&target.args).envs(&target.env);
        }))?;

        let service = ()
            .serve(transport)
            .await
            .map_err(|e| Error::Initialize(e.to_string()))?;

        info!(server = %target, peer = ?service.peer_info(), "connected to MCP server");
        Ok(Self { target, service })
    }

    /// The command this client was launched with.
    pub fn target(&self) -> &LaunchTarget {
        &self.target
    }

    /// List every tool the server advertises.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let response = self
            .service
            .list_tools(Default::default())
            .await
            .map_err(|e| Error::ListTools(e.to_string()))?;
        debug!(count = response.tools.len(), "listed tools");
        Ok(response.tools)
    }

    /// Call a tool by name.
    ///
    /// A result the server flags as an error is returned as
    /// [`Error::ToolFailed`] carrying the result's text.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult> {
        let params = CallToolRequestParams {
            name: name.to_string().into(),
            arguments,
            meta: None,
            task: None,
        };

        let result = self
            .service
            .call_tool(params)
            .await
            .map_err(|e| Error::CallTool(e.to_string()))?;

        checked(result)
    }

    /// Cancel the session and terminate the server process.
    pub async fn shutdown(self) -> Result<()> {
        let reason = self
            .service
            .cancel()
            .await
            .map_err(|e| Error::Shutdown(e.to_string()))?;
        debug!(?reason, "MCP session closed");
        Ok(())
    }
}

fn checked(result: CallToolResult) -> Result<CallToolResult> {
    if result.is_error.unwrap_or_default() {
        return Err(Error::ToolFailed(text_of(&result)));
    }
    Ok(result)
}

/// Newline-joined text segments of a tool result.
pub fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|content| match &content.raw {
            RawContent::Text(RawTextContent { text, .. }) => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
