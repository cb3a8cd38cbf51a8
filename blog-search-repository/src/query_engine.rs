//! Query execution.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::config::SearchIndexConfig;
use crate::errors::{ErrorKind, SearchError};
use crate::interfaces::EngineClient;
use crate::types::{SearchHit, SearchResults};
use blog_search_shared::{IndexDocument, QuerySpec};

/// Runs searches against an index and decodes the matching documents.
pub struct QueryEngine {
    client: Arc<dyn EngineClient>,
    config: SearchIndexConfig,
}

impl QueryEngine {
    pub fn new(client: Arc<dyn EngineClient>) -> Self {
        Self {
            client,
            config: SearchIndexConfig::default(),
        }
    }

    pub fn with_config(client: Arc<dyn EngineClient>, config: SearchIndexConfig) -> Self {
        Self { client, config }
    }

    /// Run `query` against `index` and return the matching documents in
    /// engine order.
    pub async fn search<D: IndexDocument>(
        &self,
        index: &str,
        query: &QuerySpec,
    ) -> Result<Vec<D>, SearchError> {
        Ok(self.search_detailed(index, query).await?.documents)
    }

    /// Like [`QueryEngine::search`], but also returns the total hit count and
    /// whether the engine answered with partial results.
    #[instrument(skip(self, query), fields(kind = query.kind()))]
    pub async fn search_detailed<D: IndexDocument>(
        &self,
        index: &str,
        query: &QuerySpec,
    ) -> Result<SearchResults<D>, SearchError> {
        query.validate().map_err(SearchError::invalid_query)?;

        let response = self
            .client
            .search(index, query, self.config.result_size)
            .await
            .map_err(|e| {
                SearchError::from_engine(ErrorKind::Query, &format!("search '{}'", index), e)
            })?;

        let documents = response
            .hits
            .into_iter()
            .map(|SearchHit { id, source, .. }| {
                serde_json::from_value::<D>(source)
                    .map_err(|e| SearchError::query(format!("cannot decode hit '{}': {}", id, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let degraded = response.timed_out || response.failed_shards > 0;
        if degraded {
            warn!(
                timed_out = response.timed_out,
                failed_shards = response.failed_shards,
                "Search returned partial results"
            );
        }

        debug!(
            returned = documents.len(),
            total = response.total,
            "Search complete"
        );

        Ok(SearchResults {
            documents,
            total: response.total,
            degraded,
        })
    }
}
