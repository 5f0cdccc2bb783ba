//! TTL (Time-To-Live) index for efficient expiration cleanup
//!
//! Maps expiry deadline → keys expiring at that deadline, so reclaiming
//! expired result sets costs O(expired count) instead of a full scan.

use sift_core::{SetKey, Timestamp};
use std::collections::{BTreeMap, HashSet};

/// TTL index: expiry_timestamp → Keys
#[derive(Debug, Default)]
pub struct TTLIndex {
    index: BTreeMap<Timestamp, HashSet<SetKey>>,
}

impl TTLIndex {
    /// Create a new empty TTLIndex
    pub fn new() -> Self {
        Self {
            index: BTreeMap::new(),
        }
    }

    /// Add key to TTL index with given expiry timestamp
    pub fn insert(&mut self, expiry_timestamp: Timestamp, key: SetKey) {
        self.index.entry(expiry_timestamp).or_default().insert(key);
    }

    /// Remove key from TTL index at given expiry timestamp
    ///
    /// Used when a key is overwritten or its TTL is re-armed.
    /// If the set becomes empty, removes the timestamp entry entirely.
    pub fn remove(&mut self, expiry_timestamp: Timestamp, key: &SetKey) {
        if let Some(keys) = self.index.get_mut(&expiry_timestamp) {
            keys.remove(key);
            if keys.is_empty() {
                self.index.remove(&expiry_timestamp);
            }
        }
    }

    /// Find all keys whose deadline is at or before `now`
    pub fn find_expired(&self, now: Timestamp) -> Vec<SetKey> {
        self.index
            .range(..=now)
            .flat_map(|(_, keys)| keys.iter().cloned())
            .collect()
    }

    /// Drop every entry with a deadline at or before `now`
    ///
    /// Returns the number of keys removed from the index.
    pub fn remove_expired(&mut self, now: Timestamp) -> usize {
        let expired_timestamps: Vec<Timestamp> =
            self.index.range(..=now).map(|(ts, _)| *ts).collect();

        let mut count = 0;
        for ts in expired_timestamps {
            if let Some(keys) = self.index.remove(&ts) {
                count += keys.len();
            }
        }
        count
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total number of keys in the index
    pub fn len(&self) -> usize {
        self.index.values().map(|keys| keys.len()).sum()
    }
}
