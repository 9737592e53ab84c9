//! Conversation types and the model endpoint trait.

pub mod errors;
pub mod types;

pub use errors::ModelError;
pub use types::{
    Backend, CallOutcome, Conversation, ModelRequest, ModelResponse, Outcome, Part, ProposedCall,
    Role, ToolConfig, Turn, Usage,
};
