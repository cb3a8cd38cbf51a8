//! Configuration types for the ingestion and query components.

/// Configuration shared by the `DocumentIngestor` and `QueryEngine`.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Maximum number of documents in one bulk request. None disables the check.
    pub max_batch_size: Option<usize>,
    /// Number of hits requested per search. None leaves the engine default.
    pub result_size: Option<usize>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
            result_size: None,
        }
    }
}

impl SearchIndexConfig {
    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..Default::default()
        }
    }

    /// Request `result_size` hits per search.
    pub fn with_result_size(mut self, result_size: usize) -> Self {
        self.result_size = Some(result_size);
        self
    }
}
