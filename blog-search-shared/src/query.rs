//! Supported query shapes.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A search request against a single index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuerySpec {
    /// Exact match of `value` against `field`. Analysis of the value is
    /// governed by the field's mapping.
    Term { field: String, value: String },
    /// Every document in the index, up to the engine's result window.
    MatchAll,
    /// Documents whose `field` lies strictly between `lower` and `upper`.
    DateRange {
        field: String,
        lower: NaiveDateTime,
        upper: NaiveDateTime,
    },
}

impl QuerySpec {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn match_all() -> Self {
        Self::MatchAll
    }

    pub fn date_range(field: impl Into<String>, lower: NaiveDateTime, upper: NaiveDateTime) -> Self {
        Self::DateRange {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            QuerySpec::Term { .. } => "term",
            QuerySpec::MatchAll => "match_all",
            QuerySpec::DateRange { .. } => "date_range",
        }
    }

    /// Reject queries that cannot match anything or that the engine would refuse.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            QuerySpec::Term { field, .. } if field.trim().is_empty() => {
                Err("term query requires a field".to_string())
            }
            QuerySpec::DateRange { field, .. } if field.trim().is_empty() => {
                Err("date range query requires a field".to_string())
            }
            QuerySpec::DateRange { lower, upper, .. } if lower >= upper => Err(format!(
                "date range lower bound {} is not before upper bound {}",
                lower, upper
            )),
            _ => Ok(()),
        }
    }
}
