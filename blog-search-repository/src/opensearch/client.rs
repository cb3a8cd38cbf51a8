//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `EngineClient`
//! using the OpenSearch Rust client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{
        Connection, ConnectionPool, SingleNodeConnectionPool, Transport, TransportBuilder,
    },
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesGetParts},
    params::Refresh,
    BulkParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::{EngineError, SearchError};
use crate::interfaces::EngineClient;
use crate::opensearch::index_config::build_index_body;
use crate::opensearch::queries::build_search_body;
use crate::topology::ConnectionTopology;
use crate::types::{BulkItemResponse, BulkResponse, IndexedDocument, SearchHit, SearchHits};
use blog_search_shared::{IndexDescriptor, QuerySpec};

/// Transport-level settings for the OpenSearch client.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Per-request deadline. None keeps the transport default.
    pub request_timeout: Option<Duration>,
    /// Ask the engine to make writes visible to search before answering.
    pub refresh_writes: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            refresh_writes: false,
        }
    }
}

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// let topology = ConnectionTopology::parse(&["http://localhost:9200"])?;
/// let client = OpenSearchClient::new(&topology, TransportOptions::default())?;
///
/// let descriptor = IndexDescriptor::for_document::<Post>("my_new_blog");
/// client.create_index(&descriptor).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    options: TransportOptions,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the given topology.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError::ConfigurationError)` - If the transport cannot be built
    pub fn new(
        topology: &ConnectionTopology,
        options: TransportOptions,
    ) -> Result<Self, SearchError> {
        let transport = build_transport(topology, &options)
            .map_err(|e| SearchError::configuration(format!("failed to build transport: {}", e)))?;

        info!(
            nodes = topology.endpoints().len(),
            multi_node = topology.is_multi_node(),
            refresh_writes = options.refresh_writes,
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            options,
        })
    }

    /// Check if the cluster is reachable and not red.
    pub async fn health_check(&self) -> Result<bool, EngineError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await?;

        let health = read_json(response).await?;
        let status = health
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        info!(status = %status, "OpenSearch cluster status");
        Ok(status == "green" || status == "yellow")
    }

    /// Extract index names from a get-index response.
    ///
    /// The response is an object keyed by index name.
    fn parse_index_names(body: &Value) -> Result<Vec<String>, EngineError> {
        body.as_object()
            .map(|indices| indices.keys().cloned().collect())
            .ok_or_else(|| EngineError::malformed("get index response is not an object"))
    }

    fn parse_index_response(body: &Value) -> Result<IndexedDocument, EngineError> {
        let id = body
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::malformed("index response has no _id"))?;
        let result = body
            .get("result")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        Ok(IndexedDocument {
            id: id.to_string(),
            result: result.to_string(),
        })
    }

    /// Parse a bulk response into one item per submitted document.
    fn parse_bulk_response(body: &Value, expected: usize) -> Result<BulkResponse, EngineError> {
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| EngineError::malformed("bulk response has no items"))?;

        if items.len() != expected {
            return Err(EngineError::malformed(format!(
                "bulk response has {} items for {} documents",
                items.len(),
                expected
            )));
        }

        let items = items
            .iter()
            .map(Self::parse_bulk_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BulkResponse { items })
    }

    fn parse_bulk_item(item: &Value) -> Result<BulkItemResponse, EngineError> {
        // Each item is keyed by its action, e.g. {"index": {...}}
        let result = item
            .as_object()
            .and_then(|actions| actions.values().next())
            .ok_or_else(|| EngineError::malformed("bulk item has no action"))?;

        let status = result
            .get("status")
            .and_then(Value::as_u64)
            .ok_or_else(|| EngineError::malformed("bulk item has no status"))?;
        let status = u16::try_from(status).map_err(|_| {
            EngineError::malformed(format!("bulk item status {} is out of range", status))
        })?;

        let error = result.get("error").map(describe_error);

        Ok(BulkItemResponse {
            id: result
                .get("_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            status,
            error,
        })
    }

    /// Parse a search response.
    fn parse_search_response(body: &Value) -> Result<SearchHits, EngineError> {
        let hits = body
            .get("hits")
            .ok_or_else(|| EngineError::malformed("search response has no hits"))?;

        let raw_hits = hits
            .get("hits")
            .and_then(Value::as_array)
            .ok_or_else(|| EngineError::malformed("search response has no hits array"))?;

        let parsed = raw_hits
            .iter()
            .map(Self::parse_hit)
            .collect::<Result<Vec<_>, _>>()?;

        // `total` is an object on recent engines and a bare number on older ones
        let total = match hits.get("total") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(total) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
            None => parsed.len() as u64,
        };

        Ok(SearchHits {
            total,
            hits: parsed,
            timed_out: body
                .get("timed_out")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            failed_shards: body
                .pointer("/_shards/failed")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        })
    }

    fn parse_hit(hit: &Value) -> Result<SearchHit, EngineError> {
        let source = hit
            .get("_source")
            .cloned()
            .ok_or_else(|| EngineError::malformed("search hit has no _source"))?;

        Ok(SearchHit {
            id: hit
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            score: hit.get("_score").and_then(Value::as_f64),
            source,
        })
    }
}

/// Hands out the configured nodes in turn, wrapping after the last one.
/// Built only from a multi-node topology, so it is never empty.
#[derive(Debug, Clone)]
struct RoundRobinConnectionPool {
    connections: Arc<[Connection]>,
    cursor: Arc<AtomicUsize>,
}

impl RoundRobinConnectionPool {
    fn new(urls: &[Url]) -> Self {
        Self {
            connections: urls.iter().cloned().map(Connection::new).collect(),
            cursor: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ConnectionPool for RoundRobinConnectionPool {
    fn next(&self) -> Connection {
        let position = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.connections[position % self.connections.len()].clone()
    }
}

fn build_transport(
    topology: &ConnectionTopology,
    options: &TransportOptions,
) -> Result<Transport, opensearch::http::transport::BuildError> {
    match topology {
        ConnectionTopology::SingleNode(url) => {
            let mut builder =
                TransportBuilder::new(SingleNodeConnectionPool::new(url.clone())).disable_proxy();
            if let Some(timeout) = options.request_timeout {
                builder = builder.timeout(timeout);
            }
            builder.build()
        }
        ConnectionTopology::MultiNode(urls) => {
            let mut builder =
                TransportBuilder::new(RoundRobinConnectionPool::new(urls)).disable_proxy();
            if let Some(timeout) = options.request_timeout {
                builder = builder.timeout(timeout);
            }
            builder.build()
        }
    }
}

/// Return the body of a successful response as JSON.
async fn read_json(response: Response) -> Result<Value, EngineError> {
    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "Engine request failed");
        return Err(EngineError::status(status.as_u16(), body));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| EngineError::malformed(e.to_string()))
}

/// Render an engine error object as `type: reason`.
fn describe_error(error: &Value) -> String {
    let kind = error.get("type").and_then(Value::as_str);
    let reason = error.get("reason").and_then(Value::as_str);
    match (kind, reason) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        (Some(kind), None) => kind.to_string(),
        _ => error.to_string(),
    }
}

#[async_trait]
impl EngineClient for OpenSearchClient {
    #[instrument(skip(self))]
    async fn existing_indices(&self, name: &str) -> Result<Vec<String>, EngineError> {
        let response = self
            .client
            .indices()
            .get(IndicesGetParts::Index(&[name]))
            .send()
            .await?;

        // 404 means nothing matches the name
        if response.status_code().as_u16() == 404 {
            debug!(index = %name, "No matching index");
            return Ok(Vec::new());
        }

        let body = read_json(response).await?;
        Self::parse_index_names(&body)
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, name: &str) -> Result<(), EngineError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[name]))
            .send()
            .await?;

        // 404 is acceptable - the index may already be gone
        if response.status_code().as_u16() == 404 {
            debug!(index = %name, "Index already absent");
            return Ok(());
        }

        read_json(response).await?;
        debug!(index = %name, "Index deleted");
        Ok(())
    }

    #[instrument(skip(self, descriptor), fields(index = %descriptor.name))]
    async fn create_index(&self, descriptor: &IndexDescriptor) -> Result<(), EngineError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&descriptor.name))
            .body(build_index_body(descriptor))
            .send()
            .await?;

        let body = read_json(response).await?;
        if body.get("acknowledged").and_then(Value::as_bool) == Some(false) {
            return Err(EngineError::malformed(format!(
                "creation of '{}' was not acknowledged",
                descriptor.name
            )));
        }

        debug!(index = %descriptor.name, "Index created");
        Ok(())
    }

    #[instrument(skip(self, document))]
    async fn index_one(
        &self,
        index: &str,
        document: &Value,
    ) -> Result<IndexedDocument, EngineError> {
        let mut request = self.client.index(IndexParts::Index(index)).body(document);
        if self.options.refresh_writes {
            request = request.refresh(Refresh::WaitFor);
        }

        let response = request.send().await?;
        let body = read_json(response).await?;
        let indexed = Self::parse_index_response(&body)?;

        debug!(index = %index, doc_id = %indexed.id, "Document indexed");
        Ok(indexed)
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn index_bulk(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<BulkResponse, EngineError> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            body.push(json!({ "index": {} }).into());
            body.push(document.clone().into());
        }

        let mut request = self.client.bulk(BulkParts::Index(index)).body(body);
        if self.options.refresh_writes {
            request = request.refresh(Refresh::WaitFor);
        }

        let response = request.send().await?;
        let body = read_json(response).await?;
        let parsed = Self::parse_bulk_response(&body, documents.len())?;

        debug!(index = %index, count = documents.len(), "Bulk request completed");
        Ok(parsed)
    }

    #[instrument(skip(self, query), fields(kind = query.kind()))]
    async fn search(
        &self,
        index: &str,
        query: &QuerySpec,
        size: Option<usize>,
    ) -> Result<SearchHits, EngineError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(build_search_body(query, size))
            .send()
            .await?;

        let body = read_json(response).await?;
        Self::parse_search_response(&body)
    }
}
