//! # Blog Search Repository
//!
//! This crate manages a search index and the documents in it. It includes
//! the error taxonomy, the abstract `EngineClient` interface, a concrete
//! OpenSearch implementation, and the three components built on top of it:
//! `IndexManager`, `DocumentIngestor` and `QueryEngine`.

pub mod config;
pub mod errors;
pub mod index_manager;
pub mod ingestor;
pub mod interfaces;
pub mod opensearch;
pub mod query_engine;
pub mod retry;
pub mod topology;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::SearchIndexConfig;
pub use errors::{EngineError, ErrorKind, SearchError};
pub use index_manager::IndexManager;
pub use ingestor::DocumentIngestor;
pub use interfaces::EngineClient;
pub use opensearch::{OpenSearchClient, TransportOptions};
pub use query_engine::QueryEngine;
pub use retry::{RetryPolicy, RetryingEngineClient};
pub use topology::{select_topology, ConnectionTopology};
pub use types::{BulkIngestionSummary, IndexedDocument, IngestionOutcome, SearchResults};
