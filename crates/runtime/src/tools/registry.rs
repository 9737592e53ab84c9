//! Per-connection cache of tool declarations.

use std::collections::HashSet;

use tracing::{info, warn};

use super::ToolExecutor;
use crate::model::ToolConfig;
use crate::schema::{FunctionDeclaration, ToolDescriptor, translate};
use crate::{Error, Result};

/// Tools available on one tool-server connection, translated for the model.
///
/// Immutable once loaded; reconnecting needs a fresh registry.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    declarations: Vec<FunctionDeclaration>,
    names: Vec<String>,
}

impl ToolRegistry {
    /// Fetch the executor's tool listing and translate every entry.
    ///
    /// A failed listing is a connection error. An empty listing is fine.
    pub async fn load<T: ToolExecutor>(executor: &T) -> Result<Self> {
        let descriptors = executor
            .list_tools()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        let registry = Self::from_descriptors(descriptors);
        info!(tools = ?registry.names, "loaded tool registry");
        Ok(registry)
    }

    /// Build a registry from descriptors, keeping the first of any duplicate names.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let mut registry = Self::default();

        for descriptor in descriptors {
            if !seen.insert(descriptor.name.clone()) {
                warn!(tool = %descriptor.name, "duplicate tool name in listing, keeping the first");
                continue;
            }
            registry.names.push(descriptor.name.clone());
            registry.declarations.push(translate(&descriptor));
            registry.descriptors.push(descriptor);
        }

        registry
    }

    /// Names the model may call, in listing order.
    pub fn allowed_names(&self) -> &[String] {
        &self.names
    }

    pub fn declarations(&self) -> &[FunctionDeclaration] {
        &self.declarations
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Configuration forcing a call against every registered tool.
    ///
    /// `None` when there are no tools, since a forced call has nothing to
    /// choose from.
    pub fn forced_config(&self) -> Option<ToolConfig<'_>> {
        if self.is_empty() {
            return None;
        }
        Some(ToolConfig {
            force_call: true,
            allowed_names: &self.names,
            declarations: &self.declarations,
        })
    }
}
