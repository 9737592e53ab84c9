//! Resolving the tool server's launch command.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// How to start an MCP server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl LaunchTarget {
    /// Launch an arbitrary command with arguments.
    pub fn command(
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: HashMap::new(),
        }
    }

    /// Resolve a server script path into a launch command.
    ///
    /// Python scripts run under `python`, JavaScript under `node`. Anything
    /// else is treated as an executable.
    pub fn from_script(path: impl AsRef<str>) -> Result<Self> {
        let path = path.as_ref().trim();
        if path.is_empty() {
            return Err(Error::InvalidTarget("empty server path".into()));
        }

        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let target = match extension.as_deref() {
            Some("py") => Self::command("python", [path]),
            Some("js") | Some("mjs") => Self::command("node", [path]),
            _ => Self::command(path, Vec::<String>::new()),
        };
        Ok(target)
    }

    /// Add an environment variable for the server process.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_script_runs_under_python() {
        let target = LaunchTarget::from_script("servers/lights.py").unwrap();
        assert_eq!(target.command, "python");
        assert_eq!(target.args, vec!["servers/lights.py"]);
    }

    #[test]
    fn javascript_runs_under_node() {
        let target = LaunchTarget::from_script("build/index.js").unwrap();
        assert_eq!(target.command, "node");
        assert_eq!(target.to_string(), "node build/index.js");
    }

    #[test]
    fn other_paths_are_executed_directly() {
        let target = LaunchTarget::from_script("./mcp-server-lights").unwrap();
        assert_eq!(target.command, "./mcp-server-lights");
        assert!(target.args.is_empty());
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(matches!(
            LaunchTarget::from_script("  "),
            Err(Error::InvalidTarget(_))
        ));
    }
}
