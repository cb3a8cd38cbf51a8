//! Dependency initialization and wiring for the blog search run.

use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::AppError;
use blog_search_repository::{
    DocumentIngestor, EngineClient, IndexManager, OpenSearchClient, QueryEngine,
    RetryingEngineClient,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub index_manager: IndexManager,
    pub ingestor: DocumentIngestor,
    pub query_engine: QueryEngine,
}

impl Dependencies {
    /// Connect to the configured nodes and build the components.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If the client cannot be built or the cluster is
    ///   unreachable or red
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let nodes: Vec<&str> = config.topology.endpoints().iter().map(|url| url.as_str()).collect();
        info!(
            nodes = ?nodes,
            multi_node = config.topology.is_multi_node(),
            index = %config.index_name,
            "Initializing dependencies"
        );

        let search_client = OpenSearchClient::new(&config.topology, config.transport_options())?;

        // Verify OpenSearch is reachable
        let healthy = search_client
            .health_check()
            .await
            .map_err(|e| AppError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(AppError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        Ok(Self::from_client(Arc::new(search_client), config))
    }

    /// Build the components on top of an existing engine client, adding the
    /// configured retry policy.
    pub fn from_client(client: Arc<dyn EngineClient>, config: &AppConfig) -> Self {
        let client: Arc<dyn EngineClient> =
            Arc::new(RetryingEngineClient::new(client, config.retry.clone()));

        Self {
            index_manager: IndexManager::new(client.clone()),
            ingestor: DocumentIngestor::with_config(client.clone(), config.search_config()),
            query_engine: QueryEngine::with_config(client, config.search_config()),
        }
    }
}
