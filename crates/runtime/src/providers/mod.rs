//! Model endpoint adapters.
//!
//! Each provider implements [`Backend`](crate::model::Backend) for its API.

mod gemini;

pub use gemini::{DEFAULT_BASE_URL, GeminiBackend, GeminiBackendBuilder};
