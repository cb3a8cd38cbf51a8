//! Indexed document types.

use chrono::NaiveDateTime;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::schema::{FieldType, Schema};

/// A document type that can be stored in a search index.
///
/// The schema drives the field mapping used when the index is created, so the
/// same index management code serves any document shape.
pub trait IndexDocument: Serialize + DeserializeOwned + Send + Sync {
    /// Field mapping for this document type.
    fn schema() -> Schema;

    /// Check the document's invariants before it is submitted.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Identifier of the user who wrote the post.
    pub user_id: i64,
    /// Post body. Must not be blank.
    pub text: String,
    /// When the post was written.
    pub date: NaiveDateTime,
}

impl Post {
    pub const USER_ID_FIELD: &'static str = "user_id";
    pub const TEXT_FIELD: &'static str = "text";
    pub const DATE_FIELD: &'static str = "date";

    pub fn new(user_id: i64, text: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            user_id,
            text: text.into(),
            date,
        }
    }
}

impl IndexDocument for Post {
    fn schema() -> Schema {
        Schema::new()
            .with_field(Self::USER_ID_FIELD, FieldType::Long)
            .with_field(Self::TEXT_FIELD, FieldType::Text)
            .with_field(Self::DATE_FIELD, FieldType::Date)
    }

    fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err(format!("post by user {} has no text", self.user_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_post_schema() {
        let schema = Post::schema();

        assert_eq!(schema.field_type("user_id"), Some(FieldType::Long));
        assert_eq!(schema.field_type("text"), Some(FieldType::Text));
        assert_eq!(schema.field_type("date"), Some(FieldType::Date));
    }

    #[test]
    fn test_post_validate() {
        assert!(Post::new(1, "blog post one", date(2019, 6, 1)).validate().is_ok());
        assert!(Post::new(1, "", date(2019, 6, 1)).validate().is_err());
        assert!(Post::new(1, "   ", date(2019, 6, 1)).validate().is_err());
    }

    #[test]
    fn test_post_serialization_format() {
        let post = Post::new(42, "hello", date(2019, 6, 1));
        let value = serde_json::to_value(&post).unwrap();

        assert_eq!(value["user_id"], 42);
        assert_eq!(value["text"], "hello");
        assert_eq!(value["date"], "2019-06-01T00:00:00");

        let parsed: Post = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, post);
    }
}
