//! Request and response types for engine operations.

use serde_json::Value;

/// Result of a single-document write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDocument {
    /// Identifier assigned by the engine.
    pub id: String,
    /// Engine result label, e.g. `created`.
    pub result: String,
}

/// Engine response for one item of a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemResponse {
    pub id: Option<String>,
    pub status: u16,
    pub error: Option<String>,
}

/// Engine response for a bulk request, one item per submitted document in
/// submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResponse {
    pub items: Vec<BulkItemResponse>,
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: Option<f64>,
    pub source: Value,
}

/// Engine response for a search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    /// Total number of matches reported by the engine.
    pub total: u64,
    pub hits: Vec<SearchHit>,
    pub timed_out: bool,
    /// Number of shards that failed to answer.
    pub failed_shards: u64,
}

/// Outcome of one document of a bulk ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionOutcome {
    /// Position of the document in the submitted batch.
    pub position: usize,
    /// Identifier assigned by the engine, when the write succeeded.
    pub document_id: Option<String>,
    pub success: bool,
    /// Engine diagnostic for a failed write.
    pub error: Option<String>,
}

/// Summary of a bulk ingestion containing aggregate counts and the outcome of
/// every document, in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkIngestionSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<IngestionOutcome>,
}

impl BulkIngestionSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_outcomes(outcomes: Vec<IngestionOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Positions of the documents the engine rejected.
    pub fn failed_positions(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.position)
            .collect()
    }

    /// The subset of `documents` that was rejected, for resubmission.
    ///
    /// `documents` must be the slice that produced this summary.
    pub fn failed_documents<'a, D>(&self, documents: &'a [D]) -> Vec<&'a D> {
        self.failed_positions()
            .into_iter()
            .filter_map(|position| documents.get(position))
            .collect()
    }

    /// Collapse the summary into whole-batch success or failure.
    pub fn into_result(self) -> Result<Self, crate::errors::SearchError> {
        if self.all_succeeded() {
            return Ok(self);
        }
        let first_error = self
            .outcomes
            .iter()
            .find_map(|o| o.error.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        Err(crate::errors::SearchError::BulkIngestionError {
            failed: self.failed,
            total: self.total,
            first_error,
        })
    }
}

/// Documents returned by a search together with response metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults<D> {
    /// Matching documents in engine order.
    pub documents: Vec<D>,
    /// Total number of matches reported by the engine, which may exceed the
    /// number of documents returned.
    pub total: u64,
    /// The search timed out or some shards failed, so results may be partial.
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SearchError;

    fn outcome(position: usize, success: bool) -> IngestionOutcome {
        IngestionOutcome {
            position,
            document_id: success.then(|| format!("doc-{}", position)),
            success,
            error: (!success).then(|| "mapper_parsing_exception".to_string()),
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary =
            BulkIngestionSummary::from_outcomes(vec![outcome(0, true), outcome(1, false), outcome(2, true)]);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.failed_positions(), vec![1]);
    }

    #[test]
    fn test_failed_documents() {
        let documents = vec!["a", "b", "c"];
        let summary =
            BulkIngestionSummary::from_outcomes(vec![outcome(0, false), outcome(1, true), outcome(2, false)]);

        assert_eq!(summary.failed_documents(&documents), vec![&"a", &"c"]);
    }

    #[test]
    fn test_into_result() {
        let ok = BulkIngestionSummary::from_outcomes(vec![outcome(0, true)]);
        assert!(ok.into_result().is_ok());

        let failed = BulkIngestionSummary::from_outcomes(vec![outcome(0, true), outcome(1, false)]);
        match failed.into_result() {
            Err(SearchError::BulkIngestionError {
                failed,
                total,
                first_error,
            }) => {
                assert_eq!(failed, 1);
                assert_eq!(total, 2);
                assert_eq!(first_error, "mapper_parsing_exception");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = BulkIngestionSummary::empty();
        assert_eq!(summary.total, 0);
        assert!(summary.all_succeeded());
        assert!(summary.outcomes.is_empty());
    }
}
