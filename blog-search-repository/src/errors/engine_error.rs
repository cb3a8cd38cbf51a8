//! Engine error types.
//!
//! Failures reported by an `EngineClient` implementation, before they are
//! attributed to a particular operation.

use thiserror::Error;

/// Errors that can occur while talking to the search engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The request never produced a response (connection refused, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The engine answered with a non-success status.
    #[error("Engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The engine answered with a body that could not be interpreted.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl EngineError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Whether the failure is transient and the request may be repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            Self::MalformedResponse(_) => false,
        }
    }

    /// Whether the engine refused to create an index because it already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::Status { status: 400, body } if body.contains("resource_already_exists_exception")
        )
    }
}

impl From<opensearch::Error> for EngineError {
    fn from(err: opensearch::Error) -> Self {
        if err.is_json() {
            return Self::MalformedResponse(err.to_string());
        }
        match err.status_code() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => Self::Transport(err.to_string()),
        }
    }
}
