//! Inverted index writer
//!
//! Each term of a document gets one posting set `idx:<term>` holding the
//! identifiers of the documents that contain it. All add-member commands
//! for a document go out in a single atomic pipeline. Indexing is additive:
//! re-indexing a document never removes it from the posting sets of terms
//! it no longer contains.

use std::fmt;

use sift_core::{Pipeline, SetKey, SetStore};
use tracing::{debug, warn};

use crate::error::{SearchError, SearchResult};
use crate::tokenizer::tokenize;

/// Opaque document identifier supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocId(String);

impl DocId {
    /// Identifier as stored in posting sets
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        DocId(id.to_string())
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        DocId(id)
    }
}

impl From<u64> for DocId {
    fn from(id: u64) -> Self {
        DocId(id.to_string())
    }
}

impl From<i64> for DocId {
    fn from(id: i64) -> Self {
        DocId(id.to_string())
    }
}

/// Index a document's terms into their posting sets
///
/// Returns the number of add-member commands executed, which equals the
/// number of distinct terms. A document with no indexable terms issues no
/// store call and returns 0.
///
/// # Errors
///
/// Returns `SearchError::IndexWriteFailure` if the batch is rejected or
/// cannot be submitted. Nothing is retried; the batch was not applied.
pub fn index_document<S>(store: &S, doc_id: impl Into<DocId>, content: &str) -> SearchResult<usize>
where
    S: SetStore + ?Sized,
{
    let doc_id = doc_id.into();
    let terms = tokenize(content);
    if terms.is_empty() {
        debug!(target: "sift::index", doc_id = %doc_id, "No indexable terms");
        return Ok(0);
    }

    let mut pipe = Pipeline::new();
    for term in &terms {
        pipe.add_members(SetKey::for_name(term), [doc_id.as_str()]);
    }

    match store.execute(pipe) {
        Ok(replies) => {
            debug!(target: "sift::index", doc_id = %doc_id, terms = replies.len(), "Document indexed");
            Ok(replies.len())
        }
        Err(source) => {
            warn!(target: "sift::index", doc_id = %doc_id, error = %source, "Index write failed");
            Err(SearchError::IndexWriteFailure { doc_id, source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_storage::MemoryStore;

    #[test]
    fn test_index_document_returns_term_count() {
        let store = MemoryStore::new();
        let n = index_document(&store, "doc1", "These Python demo code are from Redis In Action")
            .unwrap();
        assert_eq!(n, 5);
        for term in ["python", "demo", "code", "redis", "action"] {
            assert!(store
                .members(&SetKey::for_name(term))
                .unwrap()
                .contains("doc1"));
        }
        assert!(!store.exists(&SetKey::for_name("from")).unwrap());
    }

    #[test]
    fn test_reindexing_is_idempotent() {
        let store = MemoryStore::new();
        index_document(&store, "doc1", "redis action").unwrap();
        let n = index_document(&store, "doc1", "redis action").unwrap();
        // Count reports commands, not new insertions
        assert_eq!(n, 2);
        assert_eq!(store.cardinality(&SetKey::for_name("redis")).unwrap(), 1);
    }

    #[test]
    fn test_reindexing_is_additive() {
        let store = MemoryStore::new();
        index_document(&store, 7u64, "redis").unwrap();
        index_document(&store, 7u64, "python").unwrap();
        assert!(store.members(&SetKey::for_name("redis")).unwrap().contains("7"));
        assert!(store.members(&SetKey::for_name("python")).unwrap().contains("7"));
    }

    #[test]
    fn test_empty_content_skips_store() {
        let store = MemoryStore::new();
        assert_eq!(index_document(&store, "doc1", "a is the").unwrap(), 0);
        assert_eq!(store.commands_executed(), 0);
    }

    #[test]
    fn test_store_failure_is_index_write_failure() {
        let store = MemoryStore::new();
        store.close();
        let err = index_document(&store, "doc9", "redis").unwrap_err();
        match err {
            SearchError::IndexWriteFailure { doc_id, source } => {
                assert_eq!(doc_id.as_str(), "doc9");
                assert!(matches!(source, sift_core::Error::Unavailable(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
