//! Two-phase tool-call orchestration.
//!
//! Every query costs at most two model round-trips:
//!
//! 1. The query is sent with function calling forced against the registered
//!    tools. A response without calls is the answer.
//! 2. Otherwise each proposed call is dispatched in order, the outcomes are
//!    appended as one user turn, and the full conversation is sent again
//!    without tools. That response is the answer.
//!
//! Tool failures are reported to the model as error outcomes rather than
//! aborting the query. Model failures abort the query.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::model::{
    Backend, CallOutcome, Conversation, ModelRequest, ModelResponse, ProposedCall, Turn,
};
use crate::tools::{ToolError, ToolExecutor, ToolRegistry, join_text};
use crate::Result;

/// Answer used when the model returns no text.
pub const NO_RESPONSE_TEXT: &str = "No response from model.";

/// Everything that happened while answering one query.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub answer: String,
    /// The conversation as last sent to the model.
    pub conversation: Conversation,
    /// One outcome per proposed call, in proposal order.
    pub outcomes: Vec<CallOutcome>,
}

/// Drives one query through the model and the tool executor.
pub struct Orchestrator<'a, T, B> {
    registry: &'a ToolRegistry,
    executor: &'a T,
    backend: &'a B,
    call_timeout: Option<Duration>,
}

impl<'a, T: ToolExecutor, B: Backend> Orchestrator<'a, T, B> {
    pub fn new(registry: &'a ToolRegistry, executor: &'a T, backend: &'a B) -> Self {
        Self {
            registry,
            executor,
            backend,
            call_timeout: None,
        }
    }

    /// Fail any single tool call that takes longer than `timeout`.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Answer a query.
    pub async fn process(&self, query: &str) -> Result<String> {
        Ok(self.process_detailed(query).await?.answer)
    }

    /// Answer a query, keeping the conversation and call outcomes.
    pub async fn process_detailed(&self, query: &str) -> Result<Exchange> {
        let conversation = Conversation::start(query);

        // An empty registry has nothing to force a call against.
        let proposal = self
            .backend
            .generate(ModelRequest {
                conversation: &conversation,
                tool_config: self.registry.forced_config(),
            })
            .await?;

        if proposal.calls.is_empty() {
            debug!("model answered without calling tools");
            return Ok(Exchange {
                answer: answer_text(proposal),
                conversation,
                outcomes: Vec::new(),
            });
        }

        info!(
            calls = ?proposal.calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "model proposed tool calls"
        );
        let outcomes = self.dispatch_all(&proposal.calls).await;
        let conversation = conversation
            .appended(Turn::proposals(proposal.calls))
            .appended(Turn::outcomes(outcomes.clone()));

        let finale = self
            .backend
            .generate(ModelRequest {
                conversation: &conversation,
                tool_config: None,
            })
            .await?;

        Ok(Exchange {
            answer: answer_text(finale),
            conversation,
            outcomes,
        })
    }

    /// Dispatch calls one at a time so outcomes line up with proposals.
    async fn dispatch_all(&self, calls: &[ProposedCall]) -> Vec<CallOutcome> {
        let mut outcomes = Vec::with_capacity(calls.len());
        for call in calls {
            outcomes.push(self.dispatch(call).await);
        }
        outcomes
    }

    async fn dispatch(&self, call: &ProposedCall) -> CallOutcome {
        if !self.registry.contains(&call.name) {
            warn!(tool = %call.name, "model proposed an unregistered tool, forwarding anyway");
        }

        let pending = self.executor.call_tool(&call.name, &call.args);
        let result = match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .unwrap_or_else(|_| {
                    Err(ToolError::Timeout {
                        name: call.name.clone(),
                        after: limit,
                    })
                }),
            None => pending.await,
        };

        match result {
            Ok(content) => {
                debug!(tool = %call.name, "tool call succeeded");
                CallOutcome::success(&call.name, join_text(&content))
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                CallOutcome::error(&call.name, e.to_string())
            }
        }
    }
}

fn answer_text(response: ModelResponse) -> String {
    response
        .text
        .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string())
}
