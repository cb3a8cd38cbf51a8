//! Error types for the blog search repository.

mod engine_error;
mod search_error;

pub use engine_error::EngineError;
pub use search_error::{ErrorKind, SearchError};
