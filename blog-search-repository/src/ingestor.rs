//! Document ingestion.
//!
//! The `DocumentIngestor` validates documents and submits them to an index,
//! either one at a time or as a single bulk request.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::SearchIndexConfig;
use crate::errors::{ErrorKind, SearchError};
use crate::interfaces::EngineClient;
use crate::types::{BulkIngestionSummary, BulkResponse, IndexedDocument, IngestionOutcome};
use blog_search_shared::IndexDocument;

/// Writes documents to an index.
pub struct DocumentIngestor {
    client: Arc<dyn EngineClient>,
    config: SearchIndexConfig,
}

impl DocumentIngestor {
    /// Create an ingestor with the default configuration.
    pub fn new(client: Arc<dyn EngineClient>) -> Self {
        Self {
            client,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create an ingestor with a custom configuration.
    pub fn with_config(client: Arc<dyn EngineClient>, config: SearchIndexConfig) -> Self {
        Self { client, config }
    }

    fn validate_batch_size(&self, size: usize) -> Result<(), SearchError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    fn prepare<D: IndexDocument>(document: &D) -> Result<Value, SearchError> {
        document.validate().map_err(SearchError::invalid_document)?;
        serde_json::to_value(document)
            .map_err(|e| SearchError::invalid_document(format!("cannot serialize: {}", e)))
    }

    /// Index a single document.
    ///
    /// Fails with `InvalidDocument` before any request when the document does
    /// not validate, and with `IngestionError` when the engine rejects it.
    #[instrument(skip(self, document))]
    pub async fn index_one<D: IndexDocument>(
        &self,
        index: &str,
        document: &D,
    ) -> Result<IndexedDocument, SearchError> {
        let body = Self::prepare(document)?;

        let indexed = self.client.index_one(index, &body).await.map_err(|e| {
            SearchError::from_engine(
                ErrorKind::Ingestion,
                &format!("index document into '{}'", index),
                e,
            )
        })?;

        debug!(id = %indexed.id, result = %indexed.result, "Document indexed");
        Ok(indexed)
    }

    /// Index a batch of documents in one bulk request.
    ///
    /// Every document is validated before anything is sent. Documents the
    /// engine rejects are reported in the returned summary rather than as an
    /// error; use [`BulkIngestionSummary::into_result`] to treat any rejection
    /// as a failure of the whole batch.
    ///
    /// An empty batch returns an empty summary without contacting the engine.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn index_bulk<D: IndexDocument>(
        &self,
        index: &str,
        documents: &[D],
    ) -> Result<BulkIngestionSummary, SearchError> {
        if documents.is_empty() {
            return Ok(BulkIngestionSummary::empty());
        }

        self.validate_batch_size(documents.len())?;

        let bodies = documents
            .iter()
            .enumerate()
            .map(|(position, document)| {
                Self::prepare(document).map_err(|e| match e {
                    SearchError::InvalidDocument(msg) => SearchError::invalid_document(format!(
                        "document at position {}: {}",
                        position, msg
                    )),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let response = self.client.index_bulk(index, &bodies).await.map_err(|e| {
            SearchError::from_engine(
                ErrorKind::Ingestion,
                &format!("bulk index into '{}'", index),
                e,
            )
        })?;

        let summary = summarize(response, documents.len())?;

        if summary.all_succeeded() {
            info!(succeeded = summary.succeeded, "Bulk ingestion complete");
        } else {
            warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                positions = ?summary.failed_positions(),
                "Bulk ingestion partially failed"
            );
        }

        Ok(summary)
    }
}

/// Map the engine's per-item response onto outcomes in submission order.
fn summarize(response: BulkResponse, expected: usize) -> Result<BulkIngestionSummary, SearchError> {
    if response.items.len() != expected {
        return Err(SearchError::ingestion(format!(
            "bulk response has {} items for {} documents",
            response.items.len(),
            expected
        )));
    }

    let outcomes = response
        .items
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            let success = (200..300).contains(&item.status) && item.error.is_none();
            IngestionOutcome {
                position,
                document_id: if success { item.id } else { None },
                success,
                error: if success {
                    None
                } else {
                    Some(
                        item.error
                            .unwrap_or_else(|| format!("engine returned status {}", item.status)),
                    )
                },
            }
        })
        .collect();

    Ok(BulkIngestionSummary::from_outcomes(outcomes))
}
