//! Search-level error types
//!
//! Tokenizing and parsing never fail. The only failures come from the
//! store, and they are reported with where they happened: which document
//! was being indexed, or which evaluation stage was in flight.

use std::fmt;

use sift_core::SetOp;
use thiserror::Error;

use crate::indexer::DocId;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Evaluation step that issued the failing command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Union of the terms of one synonym group (index into the plan)
    GroupUnion {
        /// Position of the group in the plan
        group: usize,
    },
    /// Intersection of the per-group operands
    Intersect,
    /// Subtraction of the excluded terms
    Exclude,
    /// A standalone set-algebra primitive
    Primitive(SetOp),
    /// Re-arming the TTL of an existing result set
    ExtendTtl,
    /// The batch failed as a whole, no single command to blame
    Pipeline,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::GroupUnion { group } => write!(f, "union of synonym group {}", group),
            Stage::Intersect => f.write_str("intersection of groups"),
            Stage::Exclude => f.write_str("exclusion"),
            Stage::Primitive(op) => write!(f, "{}", op),
            Stage::ExtendTtl => f.write_str("ttl extension"),
            Stage::Pipeline => f.write_str("pipeline submission"),
        }
    }
}

/// Errors surfaced by indexing and evaluation
#[derive(Debug, Error)]
pub enum SearchError {
    /// The indexing batch for a document was not applied
    #[error("Failed to index document '{doc_id}': {source}")]
    IndexWriteFailure {
        /// Document being indexed
        doc_id: DocId,
        /// Store failure
        #[source]
        source: sift_core::Error,
    },

    /// A store operation in the evaluation chain failed
    #[error("Evaluation failed during {stage}: {source}")]
    EvaluationFailure {
        /// Where in the chain it failed
        stage: Stage,
        /// Store failure
        #[source]
        source: sift_core::Error,
    },
}

impl SearchError {
    /// Failing evaluation stage, if this is an evaluation failure
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SearchError::EvaluationFailure { stage, .. } => Some(*stage),
            SearchError::IndexWriteFailure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_index_write_failure_display() {
        let err = SearchError::IndexWriteFailure {
            doc_id: DocId::from("doc1"),
            source: sift_core::Error::Unavailable("connection reset".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("doc1"));
        assert!(msg.contains("connection reset"));
        assert!(err.source().is_some());
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn test_evaluation_failure_names_stage() {
        let err = SearchError::EvaluationFailure {
            stage: Stage::GroupUnion { group: 2 },
            source: sift_core::Error::CommandFailed {
                index: 0,
                reason: "boom".into(),
            },
        };
        assert!(err.to_string().contains("synonym group 2"));
        assert_eq!(err.stage(), Some(Stage::GroupUnion { group: 2 }));
    }

    #[test]
    fn test_stage_display_for_primitive() {
        assert_eq!(Stage::Primitive(SetOp::Difference).to_string(), "difference");
    }
}
