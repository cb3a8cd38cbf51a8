//! OpenSearch query builders.
//!
//! This module provides functions to build OpenSearch search bodies from a
//! `QuerySpec`.

use chrono::NaiveDateTime;
use serde_json::{json, Value};

use blog_search_shared::QuerySpec;

/// Format used for date bounds; matches how documents serialize their dates.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Build an OpenSearch search body from a `QuerySpec`.
///
/// `size` limits the number of hits; `None` keeps the engine default window.
pub fn build_search_body(query: &QuerySpec, size: Option<usize>) -> Value {
    let mut body = json!({ "query": build_query(query) });
    if let Some(size) = size {
        body["size"] = json!(size);
    }
    body
}

fn build_query(query: &QuerySpec) -> Value {
    match query {
        QuerySpec::Term { field, value } => build_term_query(field, value),
        QuerySpec::MatchAll => json!({ "match_all": {} }),
        QuerySpec::DateRange {
            field,
            lower,
            upper,
        } => build_date_range_query(field, lower, upper),
    }
}

/// Exact term match. The value is not analyzed by the engine.
fn build_term_query(field: &str, value: &str) -> Value {
    json!({
        "term": {
            field: value
        }
    })
}

/// Date range with both bounds exclusive, run as a filter so it does not
/// affect scoring.
fn build_date_range_query(field: &str, lower: &NaiveDateTime, upper: &NaiveDateTime) -> Value {
    json!({
        "bool": {
            "filter": [
                {
                    "range": {
                        field: {
                            "gt": format_date(lower),
                            "lt": format_date(upper)
                        }
                    }
                }
            ]
        }
    })
}

fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}
