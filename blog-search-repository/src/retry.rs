//! Bounded retry with exponential backoff at the engine boundary.
//!
//! `RetryingEngineClient` wraps any `EngineClient` so every component built on
//! top of it gets the same retry behaviour.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::EngineError;
use crate::interfaces::EngineClient;
use crate::types::{BulkResponse, IndexedDocument, SearchHits};
use blog_search_shared::{IndexDescriptor, QuerySpec};

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for the delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (zero-based), doubling each time.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or the
    /// retries are used up.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, EngineError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempt, "Engine call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Engine call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!(operation, attempts = attempt + 1, error = %e, "Engine call failed after retries");
                    } else {
                        debug!(operation, error = %e, "Non-retryable error encountered");
                    }
                    return Err(e);
                }
            }
        }
    }
}

/// An `EngineClient` that retries transient failures of an inner client.
pub struct RetryingEngineClient {
    inner: Arc<dyn EngineClient>,
    policy: RetryPolicy,
}

impl RetryingEngineClient {
    pub fn new(inner: Arc<dyn EngineClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl EngineClient for RetryingEngineClient {
    async fn existing_indices(&self, name: &str) -> Result<Vec<String>, EngineError> {
        let inner: &dyn EngineClient = self.inner.as_ref();
        self.policy
            .run("existing_indices", move || inner.existing_indices(name))
            .await
    }

    async fn delete_index(&self, name: &str) -> Result<(), EngineError> {
        let inner: &dyn EngineClient = self.inner.as_ref();
        self.policy
            .run("delete_index", move || inner.delete_index(name))
            .await
    }

    /// A retried create that finds the index already there means an earlier
    /// attempt reached the engine and only its reply was lost.
    async fn create_index(&self, descriptor: &IndexDescriptor) -> Result<(), EngineError> {
        let inner: &dyn EngineClient = self.inner.as_ref();
        let mut attempt = 0u32;
        self.policy
            .run("create_index", move || {
                let retried = attempt > 0;
                attempt += 1;
                async move {
                    match inner.create_index(descriptor).await {
                        Err(e) if retried && e.is_already_exists() => {
                            debug!(index = %descriptor.name, "Index created by an earlier attempt");
                            Ok(())
                        }
                        other => other,
                    }
                }
            })
            .await
    }

    async fn index_one(
        &self,
        index: &str,
        document: &Value,
    ) -> Result<IndexedDocument, EngineError> {
        let inner: &dyn EngineClient = self.inner.as_ref();
        self.policy
            .run("index_one", move || inner.index_one(index, document))
            .await
    }

    async fn index_bulk(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<BulkResponse, EngineError> {
        let inner: &dyn EngineClient = self.inner.as_ref();
        self.policy
            .run("index_bulk", move || inner.index_bulk(index, documents))
            .await
    }

    async fn search(
        &self,
        index: &str,
        query: &QuerySpec,
        size: Option<usize>,
    ) -> Result<SearchHits, EngineError> {
        let inner: &dyn EngineClient = self.inner.as_ref();
        self.policy
            .run("search", move || inner.search(index, query, size))
            .await
    }
}
