//! SearchIndex: store handle plus configuration
//!
//! Bundles an `Arc` store handle with a [`SiftConfig`] so callers do not
//! thread the TTL through every call. All state stays in the store; a
//! `SearchIndex` is cheap to clone and safe to share across threads.

use std::sync::Arc;
use std::time::Duration;

use sift_core::{ResultSetId, SetOp, SetStore, SiftConfig};

use crate::error::SearchResult;
use crate::evaluator::{evaluate, QueryOutcome};
use crate::indexer::{index_document, DocId};
use crate::query::{parse, QueryPlan};
use crate::setops;

/// Full-text search over a set store
pub struct SearchIndex<S: SetStore + ?Sized> {
    store: Arc<S>,
    config: SiftConfig,
}

impl<S: SetStore + ?Sized> Clone for SearchIndex<S> {
    fn clone(&self) -> Self {
        SearchIndex {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: SetStore + ?Sized> SearchIndex<S> {
    /// Create with default configuration
    pub fn new(store: Arc<S>) -> Self {
        SearchIndex {
            store,
            config: SiftConfig::default(),
        }
    }

    /// Create with explicit configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration fails
    /// [`SiftConfig::validate`], e.g. a zero result TTL.
    pub fn with_config(store: Arc<S>, config: SiftConfig) -> sift_core::Result<Self> {
        config.validate()?;
        Ok(SearchIndex { store, config })
    }

    /// The underlying store handle
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Active configuration
    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    /// TTL given to every result set
    pub fn result_ttl(&self) -> Duration {
        self.config.result_ttl()
    }

    /// Index a document; see [`index_document`]
    pub fn index_document(&self, doc_id: impl Into<DocId>, content: &str) -> SearchResult<usize> {
        index_document(self.store.as_ref(), doc_id, content)
    }

    /// Parse a query without evaluating it
    pub fn parse(&self, query: &str) -> QueryPlan {
        parse(query)
    }

    /// Evaluate an already-parsed plan
    pub fn evaluate(&self, plan: &QueryPlan) -> SearchResult<QueryOutcome> {
        evaluate(self.store.as_ref(), plan, self.result_ttl())
    }

    /// Parse and evaluate a query
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use sift_search::SearchIndex;
    /// use sift_storage::MemoryStore;
    ///
    /// let index = SearchIndex::new(Arc::new(MemoryStore::new()));
    /// index.index_document("doc1", "redis in action").unwrap();
    /// let outcome = index.search("redis -python").unwrap();
    /// assert!(outcome.result_set().is_some());
    /// ```
    pub fn search(&self, query: &str) -> SearchResult<QueryOutcome> {
        self.evaluate(&self.parse(query))
    }

    /// Run one set-algebra primitive with the configured TTL
    pub fn set_op<N: AsRef<str>>(&self, op: SetOp, names: &[N]) -> SearchResult<ResultSetId> {
        setops::set_op(self.store.as_ref(), op, names, self.result_ttl())
    }

    /// Intersect named sets
    pub fn intersect<N: AsRef<str>>(&self, names: &[N]) -> SearchResult<ResultSetId> {
        self.set_op(SetOp::Intersect, names)
    }

    /// Union named sets
    pub fn union<N: AsRef<str>>(&self, names: &[N]) -> SearchResult<ResultSetId> {
        self.set_op(SetOp::Union, names)
    }

    /// Subtract later named sets from the first
    pub fn difference<N: AsRef<str>>(&self, names: &[N]) -> SearchResult<ResultSetId> {
        self.set_op(SetOp::Difference, names)
    }

    /// Keep a result set alive for another `ttl`
    pub fn extend_ttl(&self, id: &ResultSetId, ttl: Duration) -> SearchResult<bool> {
        setops::extend_ttl(self.store.as_ref(), id, ttl)
    }
}
