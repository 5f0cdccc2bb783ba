//! Set-algebra full-text search for sift
//!
//! This crate provides:
//! - Tokenizer with a fixed stop-word set
//! - Indexer writing one posting set per term
//! - Query parser producing synonym groups and exclusions
//! - Set-algebra primitives producing TTL-bound result sets
//! - Plan evaluator chaining those primitives in one pipeline
//! - StoreSearchExt extension trait for `store.search_index()`
//!
//! # Usage
//!
//! ```ignore
//! use sift_search::StoreSearchExt;
//!
//! let index = store.search_index();
//! index.index_document("doc1", "redis in action")?;
//! let outcome = index.search("redis +valkey -python")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod evaluator;
pub mod indexer;
pub mod query;
pub mod search_index;
pub mod setops;
pub mod tokenizer;

use sift_core::SetStore;
use std::sync::Arc;

// Re-export commonly used types
pub use error::{SearchError, SearchResult, Stage};
pub use evaluator::{evaluate, QueryOutcome};
pub use indexer::{index_document, DocId};
pub use query::{parse, QueryPlan, SynonymGroup};
pub use search_index::SearchIndex;
pub use setops::{
    difference, extend_ttl, intersect, queue_set_op, set_op, union, DEFAULT_RESULT_TTL,
};
pub use tokenizer::{is_stop_word, tokenize, STOP_WORDS};

// ============================================================================
// Store Extension
// ============================================================================

/// Extension trait giving a shared store handle a `.search_index()` accessor
pub trait StoreSearchExt<S: SetStore + ?Sized> {
    /// Search index over this store with default configuration
    fn search_index(&self) -> SearchIndex<S>;
}

impl<S: SetStore + ?Sized> StoreSearchExt<S> for Arc<S> {
    fn search_index(&self) -> SearchIndex<S> {
        SearchIndex::new(Arc::clone(self))
    }
}
