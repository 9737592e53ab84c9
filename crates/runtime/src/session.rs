//! Session management.

use std::time::Duration;

use tracing::info;

use crate::Result;
use crate::model::Backend;
use crate::orchestrator::{Exchange, Orchestrator};
use crate::tools::{ToolExecutor, ToolRegistry};

/// A connection to one tool server paired with a model endpoint.
///
/// The registry is loaded once at connect time and never changes. Queries
/// share no mutable state, so `process` takes `&self`.
pub struct Session<T, B> {
    registry: ToolRegistry,
    executor: T,
    backend: B,
    call_timeout: Option<Duration>,
}

impl<T: ToolExecutor, B: Backend> Session<T, B> {
    /// Load the executor's tools and build a session around them.
    pub async fn connect(executor: T, backend: B) -> Result<Self> {
        let registry = ToolRegistry::load(&executor).await?;
        info!(tools = registry.len(), "session connected");
        Ok(Self {
            registry,
            executor,
            backend,
            call_timeout: None,
        })
    }

    /// Fail any single tool call that takes longer than `timeout`.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Answer a query.
    pub async fn process(&self, query: &str) -> Result<String> {
        Ok(self.process_detailed(query).await?.answer)
    }

    /// Answer a query, keeping the conversation and call outcomes.
    pub async fn process_detailed(&self, query: &str) -> Result<Exchange> {
        let mut orchestrator = Orchestrator::new(&self.registry, &self.executor, &self.backend);
        if let Some(timeout) = self.call_timeout {
            orchestrator = orchestrator.with_call_timeout(timeout);
        }
        orchestrator.process_detailed(query).await
    }

    /// End the session, handing back the executor for shutdown.
    pub fn into_executor(self) -> T {
        self.executor
    }
}
