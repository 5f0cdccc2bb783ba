//! Sift - set-algebra full-text search over a key/value set store
//!
//! Documents are tokenized into posting sets (`idx:<term>`), queries are
//! parsed into synonym groups and exclusions, and evaluation composes the
//! store's native intersect/union/difference operations into a TTL-bound
//! result set.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use sift::{MemoryStore, SetStore, StoreSearchExt};
//!
//! let store = Arc::new(MemoryStore::new());
//! let index = store.search_index();
//!
//! index.index_document("doc1", "Redis in Action").unwrap();
//! let outcome = index.search("redis +valkey -python").unwrap();
//!
//! let id = outcome.result_set().unwrap();
//! assert!(store.members(&id.key()).unwrap().contains("doc1"));
//! ```
//!
//! # Architecture
//!
//! - `sift-core`: key naming, command pipelines, the `SetStore` trait, config
//! - `sift-storage`: in-memory `SetStore` with TTL expiry and a cleaner thread
//! - `sift-search`: tokenizer, indexer, parser, set algebra, evaluator

pub use sift_core::config::CONFIG_FILE_NAME;
pub use sift_core::{
    Command, Error, Pipeline, Reply, Result, ResultSetId, SetKey, SetOp, SetStore, SiftConfig,
    Timestamp, INDEX_PREFIX,
};
pub use sift_search::{
    difference, evaluate, extend_ttl, index_document, intersect, is_stop_word, parse,
    queue_set_op, set_op, tokenize, union, DocId, QueryOutcome, QueryPlan, SearchError,
    SearchIndex, SearchResult, Stage, StoreSearchExt, SynonymGroup, DEFAULT_RESULT_TTL,
    STOP_WORDS,
};
pub use sift_storage::{MemoryStore, TTLCleaner};
