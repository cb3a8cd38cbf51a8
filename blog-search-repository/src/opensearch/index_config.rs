//! OpenSearch index configuration and mappings.
//!
//! This module turns an `IndexDescriptor` into the body of a create-index
//! request.

use serde_json::{json, Map, Value};

use blog_search_shared::{FieldType, IndexDescriptor, Schema};

/// Length above which text values are not indexed in the `keyword` sub-field.
const KEYWORD_IGNORE_ABOVE: u32 = 256;

/// Build the settings and mappings for a create-index request.
///
/// The configuration includes:
/// - **Settings**: primary shard and replica counts from the descriptor
/// - **Mappings**: one property per schema field; text fields also get a
///   `keyword` sub-field for exact matching and sorting
pub fn build_index_body(descriptor: &IndexDescriptor) -> Value {
    json!({
        "settings": {
            "number_of_shards": descriptor.shard_count,
            "number_of_replicas": descriptor.replica_count
        },
        "mappings": build_mappings(&descriptor.schema)
    })
}

/// Build the `mappings` object for a schema.
pub fn build_mappings(schema: &Schema) -> Value {
    let properties: Map<String, Value> = schema
        .fields()
        .map(|(name, field_type)| (name.to_string(), field_mapping(field_type)))
        .collect();

    json!({ "properties": properties })
}

fn field_mapping(field_type: FieldType) -> Value {
    match field_type {
        FieldType::Text => json!({
            "type": "text",
            "fields": {
                "keyword": {
                    "type": "keyword",
                    "ignore_above": KEYWORD_IGNORE_ABOVE
                }
            }
        }),
        other => json!({ "type": other.engine_type() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_search_shared::Post;

    #[test]
    fn test_index_body_structure() {
        let descriptor = IndexDescriptor::for_document::<Post>("my_new_blog")
            .with_shards(3)
            .with_replicas(2);
        let body = build_index_body(&descriptor);

        assert_eq!(body["settings"]["number_of_shards"], 3);
        assert_eq!(body["settings"]["number_of_replicas"], 2);

        let properties = &body["mappings"]["properties"];
        assert_eq!(properties["user_id"]["type"], "long");
        assert_eq!(properties["text"]["type"], "text");
        assert_eq!(properties["date"]["type"], "date");
    }

    #[test]
    fn test_text_fields_get_keyword_subfield() {
        let schema = Schema::new().with_field("text", FieldType::Text);
        let mappings = build_mappings(&schema);

        let keyword = &mappings["properties"]["text"]["fields"]["keyword"];
        assert_eq!(keyword["type"], "keyword");
        assert_eq!(keyword["ignore_above"], 256);
    }

    #[test]
    fn test_mapping_covers_every_field() {
        let schema = Schema::new()
            .with_field("a", FieldType::Keyword)
            .with_field("b", FieldType::Integer)
            .with_field("c", FieldType::Double)
            .with_field("d", FieldType::Boolean);
        let mappings = build_mappings(&schema);

        let properties = mappings["properties"].as_object().unwrap();
        assert_eq!(properties.len(), 4);
        assert_eq!(properties["a"]["type"], "keyword");
        assert_eq!(properties["b"]["type"], "integer");
        assert_eq!(properties["c"]["type"], "double");
        assert_eq!(properties["d"]["type"], "boolean");
        assert!(properties["a"].get("fields").is_none());
    }
}
