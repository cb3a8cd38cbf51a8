//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::EngineError;
use crate::types::{BulkResponse, IndexedDocument, SearchHits};
use blog_search_shared::{IndexDescriptor, QuerySpec};

/// Abstract interface for search engine operations.
///
/// This trait is the complete set of engine capabilities the index manager,
/// the document ingestor and the query engine rely on. Implementations can be
/// swapped for different backends (OpenSearch, mock, etc.).
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, EngineError>`. Callers attribute the error to
/// the operation that failed.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Names of the indices matching `name`.
    ///
    /// The lookup may be a pattern match, so more than one index can be
    /// returned. An empty list means no index exists under that name.
    async fn existing_indices(&self, name: &str) -> Result<Vec<String>, EngineError>;

    /// Delete an index. Deleting an index that does not exist succeeds.
    async fn delete_index(&self, name: &str) -> Result<(), EngineError>;

    /// Create an index with the settings and field mapping of `descriptor`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the engine acknowledged the creation
    /// * `Err(EngineError)` - If the index already exists or creation failed
    async fn create_index(&self, descriptor: &IndexDescriptor) -> Result<(), EngineError>;

    /// Index a single document. The engine assigns its identifier.
    async fn index_one(&self, index: &str, document: &Value)
        -> Result<IndexedDocument, EngineError>;

    /// Index multiple documents in a single bulk request.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - One item per document, in submission order,
    ///   including items the engine rejected
    /// * `Err(EngineError)` - If the request as a whole failed
    async fn index_bulk(&self, index: &str, documents: &[Value])
        -> Result<BulkResponse, EngineError>;

    /// Execute a search against an index.
    ///
    /// # Arguments
    ///
    /// * `index` - The index to search
    /// * `query` - The query shape to run
    /// * `size` - Maximum number of hits, or `None` for the engine default
    async fn search(
        &self,
        index: &str,
        query: &QuerySpec,
        size: Option<usize>,
    ) -> Result<SearchHits, EngineError>;
}
