//! MCP (Model Context Protocol) client for tool servers run as child processes.
//!
//! Wraps the official rmcp SDK: resolves how to launch a server, performs the
//! handshake over stdio, and exposes tool listing and invocation.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{Client, LaunchTarget};
//!
//! # async fn example() -> mcp::Result<()> {
//! let client = Client::spawn(LaunchTarget::from_script("servers/lights.py")?).await?;
//!
//! for tool in client.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//!
//! let mut args = serde_json::Map::new();
//! args.insert("brightness".into(), 30.into());
//! let result = client.call_tool("controlLight", Some(args)).await?;
//! println!("{}", mcp::text_of(&result));
//!
//! client.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod launch;

pub use client::{Client, text_of};
pub use error::{Error, Result};
pub use launch::LaunchTarget;
pub use rmcp::model::{CallToolResult, Content, RawContent, Tool};
