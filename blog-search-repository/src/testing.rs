//! In-memory engine used by the component tests.
//!
//! Evaluates the supported query shapes over stored JSON documents and can be
//! told to fail specific operations.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::errors::EngineError;
use crate::interfaces::EngineClient;
use crate::types::{BulkItemResponse, BulkResponse, IndexedDocument, SearchHit, SearchHits};
use blog_search_shared::{FieldType, IndexDescriptor, QuerySpec};

const DEFAULT_RESULT_WINDOW: usize = 10;

struct StoredIndex {
    descriptor: IndexDescriptor,
    documents: Vec<(String, Value)>,
}

#[derive(Default)]
struct State {
    indices: BTreeMap<String, StoredIndex>,
    next_id: u64,
    calls: Vec<&'static str>,
    failures: HashMap<&'static str, EngineError>,
    lost_create_reply: bool,
    aliases: HashMap<String, Vec<String>>,
}

#[derive(Default)]
pub(crate) struct InMemoryEngine {
    state: Mutex<State>,
}

impl InMemoryEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `operation` fail with `error`.
    pub(crate) async fn fail_next(&self, operation: &'static str, error: EngineError) {
        self.state.lock().await.failures.insert(operation, error);
    }

    /// Apply the next `create_index`, then answer it with a transport failure.
    pub(crate) async fn lose_next_create_reply(&self) {
        self.state.lock().await.lost_create_reply = true;
    }

    /// Make `alias` resolve to `targets` in existence checks.
    pub(crate) async fn add_alias(&self, alias: &str, targets: &[&str]) {
        self.state.lock().await.aliases.insert(
            alias.to_string(),
            targets.iter().map(|target| target.to_string()).collect(),
        );
    }

    pub(crate) async fn calls(&self) -> Vec<&'static str> {
        self.state.lock().await.calls.clone()
    }

    pub(crate) async fn descriptor(&self, name: &str) -> Option<IndexDescriptor> {
        self.state
            .lock()
            .await
            .indices
            .get(name)
            .map(|index| index.descriptor.clone())
    }

    pub(crate) async fn document_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .await
            .indices
            .get(name)
            .map_or(0, |index| index.documents.len())
    }

    /// Store a document without any mapping checks.
    pub(crate) async fn insert_raw(&self, name: &str, document: Value) {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = state.next_id.to_string();
        if let Some(index) = state.indices.get_mut(name) {
            index.documents.push((id, document));
        }
    }

    fn enter(state: &mut State, operation: &'static str) -> Result<(), EngineError> {
        state.calls.push(operation);
        match state.failures.remove(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn index_not_found(name: &str) -> EngineError {
        EngineError::status(404, format!("index_not_found_exception: no such index [{}]", name))
    }
}

/// Mimics the engine's dynamic checks for the mapped field types.
fn mapping_conflict(descriptor: &IndexDescriptor, document: &Value) -> Option<String> {
    for (field, field_type) in descriptor.schema.fields() {
        let Some(value) = document.get(field) else {
            continue;
        };
        let valid = match field_type {
            FieldType::Date => value.as_str().and_then(parse_date).is_some(),
            FieldType::Long | FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Double => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Text | FieldType::Keyword => value.is_string(),
        };
        if !valid {
            return Some(format!(
                "mapper_parsing_exception: failed to parse field [{}]",
                field
            ));
        }
    }
    None
}

fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn matches(descriptor: &IndexDescriptor, query: &QuerySpec, document: &Value) -> bool {
    match query {
        QuerySpec::MatchAll => true,
        QuerySpec::Term { field, value } => match document.get(field.as_str()) {
            Some(Value::String(text)) if descriptor.schema.field_type(field) == Some(FieldType::Text) => text
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == value),
            Some(Value::String(text)) => text == value,
            Some(other) => other.to_string() == *value,
            None => false,
        },
        QuerySpec::DateRange {
            field,
            lower,
            upper,
        } => document
            .get(field.as_str())
            .and_then(Value::as_str)
            .and_then(parse_date)
            .is_some_and(|date| *lower < date && date < *upper),
    }
}

#[async_trait]
impl EngineClient for InMemoryEngine {
    async fn existing_indices(&self, name: &str) -> Result<Vec<String>, EngineError> {
        let mut state = self.state.lock().await;
        Self::enter(&mut state, "existing_indices")?;

        let names = match name.strip_suffix('*') {
            Some(prefix) => state
                .indices
                .keys()
                .filter(|existing| existing.starts_with(prefix))
                .cloned()
                .collect(),
            None => match state.aliases.get(name) {
                Some(targets) => targets
                    .iter()
                    .filter(|target| state.indices.contains_key(target.as_str()))
                    .cloned()
                    .collect(),
                None => state
                    .indices
                    .keys()
                    .filter(|existing| existing.as_str() == name)
                    .cloned()
                    .collect(),
            },
        };
        Ok(names)
    }

    async fn delete_index(&self, name: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        Self::enter(&mut state, "delete_index")?;
        state.indices.remove(name);
        // An alias disappears with the last index behind it
        for targets in state.aliases.values_mut() {
            targets.retain(|target| target != name);
        }
        state.aliases.retain(|_, targets| !targets.is_empty());
        Ok(())
    }

    async fn create_index(&self, descriptor: &IndexDescriptor) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        Self::enter(&mut state, "create_index")?;

        if state.indices.contains_key(&descriptor.name) {
            return Err(EngineError::status(
                400,
                format!(
                    "resource_already_exists_exception: index [{}] already exists",
                    descriptor.name
                ),
            ));
        }
        state.indices.insert(
            descriptor.name.clone(),
            StoredIndex {
                descriptor: descriptor.clone(),
                documents: Vec::new(),
            },
        );
        if std::mem::take(&mut state.lost_create_reply) {
            return Err(EngineError::transport("operation timed out"));
        }
        Ok(())
    }

    async fn index_one(
        &self,
        index: &str,
        document: &Value,
    ) -> Result<IndexedDocument, EngineError> {
        let mut state = self.state.lock().await;
        Self::enter(&mut state, "index_one")?;

        state.next_id += 1;
        let id = state.next_id.to_string();
        let stored = state
            .indices
            .get_mut(index)
            .ok_or_else(|| Self::index_not_found(index))?;

        if let Some(conflict) = mapping_conflict(&stored.descriptor, document) {
            return Err(EngineError::status(400, conflict));
        }
        stored.documents.push((id.clone(), document.clone()));

        Ok(IndexedDocument {
            id,
            result: "created".to_string(),
        })
    }

    async fn index_bulk(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<BulkResponse, EngineError> {
        let mut state = self.state.lock().await;
        Self::enter(&mut state, "index_bulk")?;

        let first_id = state.next_id + 1;
        state.next_id += documents.len() as u64;
        let stored = state
            .indices
            .get_mut(index)
            .ok_or_else(|| Self::index_not_found(index))?;

        let items = documents
            .iter()
            .zip(first_id..)
            .map(|(document, id)| match mapping_conflict(&stored.descriptor, document) {
                Some(conflict) => BulkItemResponse {
                    id: Some(id.to_string()),
                    status: 400,
                    error: Some(conflict),
                },
                None => {
                    stored.documents.push((id.to_string(), document.clone()));
                    BulkItemResponse {
                        id: Some(id.to_string()),
                        status: 201,
                        error: None,
                    }
                }
            })
            .collect();

        Ok(BulkResponse { items })
    }

    async fn search(
        &self,
        index: &str,
        query: &QuerySpec,
        size: Option<usize>,
    ) -> Result<SearchHits, EngineError> {
        let mut state = self.state.lock().await;
        Self::enter(&mut state, "search")?;

        let stored = state
            .indices
            .get(index)
            .ok_or_else(|| Self::index_not_found(index))?;

        let matching: Vec<&(String, Value)> = stored
            .documents
            .iter()
            .filter(|(_, document)| matches(&stored.descriptor, query, document))
            .collect();

        Ok(SearchHits {
            total: matching.len() as u64,
            hits: matching
                .into_iter()
                .take(size.unwrap_or(DEFAULT_RESULT_WINDOW))
                .map(|(id, document)| SearchHit {
                    id: id.clone(),
                    score: Some(1.0),
                    source: document.clone(),
                })
                .collect(),
            timed_out: false,
            failed_shards: 0,
        })
    }
}
