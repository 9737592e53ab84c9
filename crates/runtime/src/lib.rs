//! Switchboard runtime: lets a function-calling model use the tools of an
//! MCP server.
//!
//! # Overview
//!
//! - **Schema translation** ([`schema`]): projects a tool's JSON Schema onto
//!   the model's function-declaration format.
//! - **ToolRegistry**: the per-connection cache of translated declarations.
//! - **Orchestrator**: the two-phase propose → execute → finalize exchange.
//! - **Session**: owns the registry, the tool executor and the model backend.
//!
//! # Example
//!
//! ```ignore
//! use mcp::LaunchTarget;
//! use runtime::{GeminiBackend, McpToolHost, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let host = McpToolHost::spawn(LaunchTarget::from_script("servers/lights.py")?).await?;
//! let backend = GeminiBackend::builder("AIza...", "gemini-2.0-flash-001").build();
//!
//! let session = Session::connect(host, backend).await?;
//! let answer = session.process("Dim the lights so the room feels cozy and warm.").await?;
//! println!("{answer}");
//!
//! session.into_executor().shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod model;
pub mod orchestrator;
pub mod providers;
pub mod schema;
mod session;
pub mod tools;

#[cfg(test)]
mod testing;

// Error types
pub use error::{Error, Result};

// Conversation and model endpoint types
pub use model::{
    Backend, CallOutcome, Conversation, ModelError, ModelRequest, ModelResponse, Outcome, Part,
    ProposedCall, Role, ToolConfig, Turn, Usage,
};

// Schema translation
pub use schema::{FunctionDeclaration, ParamKind, ToolDescriptor, translate};

// Tool execution
pub use tools::{EmptyToolHost, McpToolHost, ToolContent, ToolError, ToolExecutor, ToolRegistry};

// Providers
pub use providers::{GeminiBackend, GeminiBackendBuilder};

// Orchestration and sessions
pub use orchestrator::{Exchange, NO_RESPONSE_TEXT, Orchestrator};
pub use session::Session;
