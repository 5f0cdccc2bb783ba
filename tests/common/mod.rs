//! Shared helpers for end-to-end tests

#![allow(dead_code)]

use std::sync::{Arc, Once};

use sift::{MemoryStore, SearchIndex, SiftConfig};
use tracing_subscriber::filter::LevelFilter;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(LevelFilter::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Fresh index over an in-memory store
pub fn test_index(config: SiftConfig) -> SearchIndex<MemoryStore> {
    init_tracing();
    SearchIndex::with_config(Arc::new(MemoryStore::new()), config).unwrap()
}

/// Small corpus shared by several tests
pub const CORPUS: &[(&str, &str)] = &[
    ("intro", "Redis in Action: connecting to Redis from Python"),
    ("chat", "Building a chat server with connection pooling"),
    ("proxy", "Chat through a proxy after disconnection"),
    ("ops", "Monitoring disconnect events in production"),
];

/// Index every document of `CORPUS`
pub fn load_corpus(index: &SearchIndex<MemoryStore>) {
    for (doc_id, content) in CORPUS {
        index.index_document(*doc_id, content).unwrap();
    }
}
