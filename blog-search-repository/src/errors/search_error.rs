//! Search error types.
//!
//! This module defines the errors surfaced to callers of the index manager,
//! the document ingestor and the query engine.

use thiserror::Error;

use crate::errors::EngineError;

/// The four failure families a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad topology or descriptor input.
    Configuration,
    /// Existence check, create or delete failed.
    IndexCreation,
    /// A single or bulk write was rejected.
    Ingestion,
    /// A search was rejected or its response could not be read.
    Query,
}

/// Errors that can occur during index management, ingestion and search.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Invalid connection or index configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to check for, create or delete an index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// A forced recreation deleted the index but could not create it again.
    /// Running `ensure_index` again creates it.
    #[error("Index '{index}' was deleted but not recreated: {reason}")]
    IndexRecreationIncomplete { index: String, reason: String },

    /// The engine rejected a document write.
    #[error("Ingestion error: {0}")]
    IngestionError(String),

    /// A document failed validation before submission.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// Some documents of a bulk request were rejected.
    #[error("Bulk ingestion error: {failed} of {total} documents failed: {first_error}")]
    BulkIngestionError {
        failed: usize,
        total: usize,
        first_error: String,
    },

    /// Search execution failed or returned an unreadable response.
    #[error("Query error: {0}")]
    QueryError(String),

    /// The provided query is invalid.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl SearchError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create an ingestion error.
    pub fn ingestion(msg: impl Into<String>) -> Self {
        Self::IngestionError(msg.into())
    }

    /// Create an invalid document error.
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create an invalid query error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// The failure family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationError(_) => ErrorKind::Configuration,
            Self::IndexCreationError(_) | Self::IndexRecreationIncomplete { .. } => {
                ErrorKind::IndexCreation
            }
            Self::IngestionError(_)
            | Self::InvalidDocument(_)
            | Self::BatchSizeExceeded { .. }
            | Self::BulkIngestionError { .. } => ErrorKind::Ingestion,
            Self::QueryError(_) | Self::InvalidQuery(_) => ErrorKind::Query,
        }
    }

    pub(crate) fn from_engine(kind: ErrorKind, context: &str, err: EngineError) -> Self {
        let msg = format!("{}: {}", context, err);
        match kind {
            ErrorKind::Configuration => Self::ConfigurationError(msg),
            ErrorKind::IndexCreation => Self::IndexCreationError(msg),
            ErrorKind::Ingestion => Self::IngestionError(msg),
            ErrorKind::Query => Self::QueryError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            SearchError::configuration("x").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            SearchError::IndexRecreationIncomplete {
                index: "blog".to_string(),
                reason: "x".to_string()
            }
            .kind(),
            ErrorKind::IndexCreation
        );
        assert_eq!(
            SearchError::batch_size_exceeded(10, 5).kind(),
            ErrorKind::Ingestion
        );
        assert_eq!(SearchError::invalid_query("x").kind(), ErrorKind::Query);
    }

    #[test]
    fn test_from_engine_keeps_context() {
        let err = SearchError::from_engine(
            ErrorKind::Query,
            "search 'blog'",
            EngineError::status(400, "parsing_exception"),
        );

        assert!(matches!(err, SearchError::QueryError(_)));
        let msg = err.to_string();
        assert!(msg.contains("search 'blog'"));
        assert!(msg.contains("parsing_exception"));
    }
}
