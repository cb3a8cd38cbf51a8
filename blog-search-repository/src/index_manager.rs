//! Index lifecycle management.
//!
//! The `IndexManager` makes sure an index exists with the expected settings
//! and field mapping before documents are written to it.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::errors::{ErrorKind, SearchError};
use crate::interfaces::EngineClient;
use blog_search_shared::IndexDescriptor;

/// Creates, recreates and drops indices.
pub struct IndexManager {
    client: Arc<dyn EngineClient>,
}

impl IndexManager {
    pub fn new(client: Arc<dyn EngineClient>) -> Self {
        Self { client }
    }

    /// Make sure the index described by `descriptor` exists.
    ///
    /// When an index already matches the descriptor name it is left untouched,
    /// unless `force_recreate` is set, in which case every match is deleted
    /// and the index is created again with the descriptor's settings.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The index was created
    /// * `Ok(false)` - The index already existed and was kept
    /// * `Err(SearchError::IndexRecreationIncomplete)` - A forced recreation
    ///   deleted the index but could not create it. Calling `ensure_index`
    ///   again creates it.
    #[instrument(skip(self, descriptor), fields(index = %descriptor.name))]
    pub async fn ensure_index(
        &self,
        descriptor: &IndexDescriptor,
        force_recreate: bool,
    ) -> Result<bool, SearchError> {
        descriptor.validate().map_err(SearchError::configuration)?;

        let existing = self.lookup(&descriptor.name).await?;

        if !existing.is_empty() {
            if !force_recreate {
                info!(matches = existing.len(), "Index already exists, keeping it");
                return Ok(false);
            }

            self.delete_all(&existing).await?;

            return match self.client.create_index(descriptor).await {
                Ok(()) => {
                    info!(
                        shards = descriptor.shard_count,
                        replicas = descriptor.replica_count,
                        "Index recreated"
                    );
                    Ok(true)
                }
                Err(e) => {
                    warn!(error = %e, "Index deleted but could not be created again");
                    Err(SearchError::IndexRecreationIncomplete {
                        index: descriptor.name.clone(),
                        reason: e.to_string(),
                    })
                }
            };
        }

        self.client.create_index(descriptor).await.map_err(|e| {
            SearchError::from_engine(
                ErrorKind::IndexCreation,
                &format!("create index '{}'", descriptor.name),
                e,
            )
        })?;

        info!(
            shards = descriptor.shard_count,
            replicas = descriptor.replica_count,
            "Index created"
        );
        Ok(true)
    }

    /// Delete every index matching `name`, returning how many were removed.
    #[instrument(skip(self))]
    pub async fn drop_index(&self, name: &str) -> Result<usize, SearchError> {
        let existing = self.lookup(name).await?;
        self.delete_all(&existing).await?;

        info!(deleted = existing.len(), "Dropped index");
        Ok(existing.len())
    }

    async fn lookup(&self, name: &str) -> Result<Vec<String>, SearchError> {
        self.client.existing_indices(name).await.map_err(|e| {
            SearchError::from_engine(
                ErrorKind::IndexCreation,
                &format!("check index '{}'", name),
                e,
            )
        })
    }

    async fn delete_all(&self, names: &[String]) -> Result<(), SearchError> {
        for name in names {
            self.client.delete_index(name).await.map_err(|e| {
                SearchError::from_engine(
                    ErrorKind::IndexCreation,
                    &format!("delete index '{}'", name),
                    e,
                )
            })?;
            info!(index = %name, "Deleted index");
        }
        Ok(())
    }
}
