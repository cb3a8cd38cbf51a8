//! Index descriptor.

use serde::{Deserialize, Serialize};

use crate::document::IndexDocument;
use crate::schema::Schema;

/// Characters the engine refuses in index names.
const FORBIDDEN_NAME_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ' '];

/// Maximum index name length in bytes.
const MAX_NAME_BYTES: usize = 255;

/// Names a target index together with its settings and field mapping.
///
/// Shard and replica counts cannot be changed on an existing index; a
/// different count requires the index to be recreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    pub shard_count: u32,
    pub replica_count: u32,
    pub schema: Schema,
}

impl IndexDescriptor {
    /// Create a descriptor with one shard and one replica.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            shard_count: 1,
            replica_count: 1,
            schema,
        }
    }

    /// Create a descriptor whose schema comes from a document type.
    pub fn for_document<D: IndexDocument>(name: impl Into<String>) -> Self {
        Self::new(name, D::schema())
    }

    pub fn with_shards(mut self, shard_count: u32) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn with_replicas(mut self, replica_count: u32) -> Self {
        self.replica_count = replica_count;
        self
    }

    /// Check the name against the engine's naming rules and the counts
    /// against their lower bounds.
    pub fn validate(&self) -> Result<(), String> {
        validate_index_name(&self.name)?;

        if self.shard_count == 0 {
            return Err("shard_count must be at least 1".to_string());
        }
        if self.replica_count == 0 {
            return Err("replica_count must be at least 1".to_string());
        }
        if self.schema.is_empty() {
            return Err(format!("index '{}' has an empty schema", self.name));
        }
        Ok(())
    }
}

/// Validate an index name.
pub fn validate_index_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("index name is empty".to_string());
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(format!("index name exceeds {} bytes", MAX_NAME_BYTES));
    }
    if name == "." || name == ".." {
        return Err(format!("'{}' is not a valid index name", name));
    }
    if name.starts_with(['-', '_', '+']) {
        return Err(format!("index name '{}' starts with an invalid character", name));
    }
    if name.chars().any(|c| c.is_uppercase()) {
        return Err(format!("index name '{}' must be lowercase", name));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(format!("index name '{}' contains '{}'", name, c));
    }
    Ok(())
}
