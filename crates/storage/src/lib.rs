//! Storage layer for sift
//!
//! This crate implements an in-process set store with:
//! - MemoryStore: HashMap-based sets behind `parking_lot::RwLock`
//! - Atomic pipeline execution (validate, then apply under one lock)
//! - TTL index for expiration
//! - TTL cleaner background task
//!
//! A networked set store can replace it by implementing
//! `sift_core::SetStore`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleaner;
pub mod memory;
pub mod stored_set;
pub mod ttl;

pub use cleaner::{TTLCleaner, MIN_CHECK_INTERVAL};
pub use memory::MemoryStore;
pub use stored_set::StoredSet;
pub use ttl::TTLIndex;
