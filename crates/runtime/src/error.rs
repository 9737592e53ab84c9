use crate::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The tool server could not be reached or would not list its tools.
    #[error("connection error: {0}")]
    Connection(String),

    /// A model request failed; the query produced no answer.
    #[error("model request failed: {0}")]
    Model(#[from] ModelError),
}

impl From<mcp::Error> for Error {
    fn from(err: mcp::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
