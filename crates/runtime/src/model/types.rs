use super::errors::ModelError;
use crate::schema::FunctionDeclaration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::future::Future;

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A function call proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedCall {
    pub name: String,
    pub args: Map<String, Value>,
    /// Opaque provider token that must be replayed with the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl ProposedCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
            thought_signature: None,
        }
    }
}

/// What came back from dispatching a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Text content of the tool result, newline-joined.
    Success(String),
    /// Why the call failed.
    Error(String),
}

/// The result of one proposed call, reported back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub name: String,
    pub outcome: Outcome,
}

impl CallOutcome {
    pub fn success(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Success(payload.into()),
        }
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Error(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }

    /// The function-response payload: `{"result": ...}` or `{"error": ...}`.
    pub fn response(&self) -> Value {
        match &self.outcome {
            Outcome::Success(result) => json!({ "result": result }),
            Outcome::Error(error) => json!({ "error": error }),
        }
    }
}

/// A part of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Part {
    Text(String),
    FunctionCall(ProposedCall),
    FunctionResponse(CallOutcome),
}

/// One role-tagged entry in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    /// A user turn holding the query text.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A model turn holding proposed calls, in the order given.
    pub fn proposals(calls: impl IntoIterator<Item = ProposedCall>) -> Self {
        Self {
            role: Role::Model,
            parts: calls.into_iter().map(Part::FunctionCall).collect(),
        }
    }

    /// A user turn holding call outcomes, in the order given.
    pub fn outcomes(outcomes: impl IntoIterator<Item = CallOutcome>) -> Self {
        Self {
            role: Role::User,
            parts: outcomes.into_iter().map(Part::FunctionResponse).collect(),
        }
    }

    /// Combined text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Proposed calls in this turn.
    pub fn calls(&self) -> Vec<&ProposedCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}

/// Append-only log of turns for one query.
///
/// Appending consumes the log and returns a longer one; existing turns are
/// never edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// A one-turn conversation holding the user's query.
    pub fn start(query: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user_text(query)],
        }
    }

    /// Return this conversation with `turn` appended.
    pub fn appended(mut self, turn: Turn) -> Self {
        self.turns.push(turn);
        self
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Function-calling configuration for a model request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolConfig<'a> {
    /// Require the response to be calls against `allowed_names`.
    pub force_call: bool,
    pub allowed_names: &'a [String],
    pub declarations: &'a [FunctionDeclaration],
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Everything needed for a model request.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub conversation: &'a Conversation,
    pub tool_config: Option<ToolConfig<'a>>,
}

/// The response from a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    /// Concatenated text, if the response had any.
    pub text: Option<String>,
    /// Proposed calls in the order the model returned them.
    pub calls: Vec<ProposedCall>,
    pub usage: Usage,
}

impl ModelResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn from_calls(calls: Vec<ProposedCall>) -> Self {
        Self {
            calls,
            ..Self::default()
        }
    }
}

/// Trait for model endpoints.
pub trait Backend: Send + Sync {
    fn generate(
        &self,
        request: ModelRequest<'_>,
    ) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send;
}
