//! Scripted executor and backend for unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::model::{Backend, Conversation, ModelError, ModelRequest, ModelResponse};
use crate::schema::ToolDescriptor;
use crate::tools::{ToolContent, ToolError, ToolExecutor};

/// Executor that records dispatches and replies from a fixed script.
#[derive(Debug, Default)]
pub struct StubExecutor {
    tools: Vec<ToolDescriptor>,
    failing: HashSet<String>,
    fail_listing: bool,
    reply: String,
    delay: Option<Duration>,
    pub dispatched: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl StubExecutor {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools,
            reply: "ok".into(),
            ..Self::default()
        }
    }

    pub fn failing_tool(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn dispatched_names(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl ToolExecutor for StubExecutor {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolError> {
        if self.fail_listing {
            return Err(ToolError::Listing("server exited".into()));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<Vec<ToolContent>, ToolError> {
        self.dispatched
            .lock()
            .unwrap()
            .push((name.to_string(), arguments.clone()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(name) {
            return Err(ToolError::Execution(format!("{name}: device offline")));
        }
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(ToolError::NotFound(name.to_string()));
        }
        Ok(vec![ToolContent::text(self.reply.clone())])
    }
}

/// A model request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub conversation: Conversation,
    pub force_call: Option<bool>,
    pub allowed_names: Vec<String>,
    pub declaration_count: usize,
}

/// Backend that replays scripted responses and records every request.
#[derive(Debug, Default)]
pub struct StubBackend {
    responses: Mutex<VecDeque<Result<ModelResponse, ModelError>>>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl StubBackend {
    pub fn new(responses: Vec<Result<ModelResponse, ModelError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Backend for StubBackend {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            conversation: request.conversation.clone(),
            force_call: request.tool_config.map(|c| c.force_call),
            allowed_names: request
                .tool_config
                .map(|c| c.allowed_names.to_vec())
                .unwrap_or_default(),
            declaration_count: request.tool_config.map_or(0, |c| c.declarations.len()),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Api("no scripted response left".into())))
    }
}
