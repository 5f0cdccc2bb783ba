//! MemoryStore: in-process set store with atomic pipelines and key expiry
//!
//! This module implements the `SetStore` capability using:
//! - `HashMap<SetKey, StoredSet>` for set storage
//! - `parking_lot::RwLock` for thread-safe access
//! - `TTLIndex` for O(expired) reclamation
//!
//! # Design Notes
//!
//! - **Atomic pipelines**: a pipeline is validated up front, then applied
//!   under one acquisition of both write locks. Readers never observe a
//!   partially applied batch.
//! - **Logical TTL expiration**: expired sets are filtered at read time and
//!   treated as absent by every command; `purge_expired()` (driven by the
//!   `TTLCleaner`) reclaims their memory.
//! - **Set-store semantics**: a set operation overwrites its destination and
//!   clears its TTL; an empty result leaves the destination absent.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, warn};

use sift_core::{Command, Error, Pipeline, Reply, Result, SetKey, SetOp, SetStore, Timestamp};

use crate::stored_set::StoredSet;
use crate::ttl::TTLIndex;

/// In-process implementation of [`SetStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key → set (possibly expired but not yet purged)
    data: RwLock<HashMap<SetKey, StoredSet>>,
    /// expiry deadline → keys, for reclamation
    ttl_index: RwLock<TTLIndex>,
    /// Total commands applied across all pipelines
    commands_executed: AtomicU64,
    /// Once set, every call fails with `Error::Unavailable`
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of commands applied since creation
    ///
    /// Rejected pipelines do not count.
    pub fn commands_executed(&self) -> u64 {
        self.commands_executed.load(Ordering::Acquire)
    }

    /// Number of live (unexpired) keys
    pub fn len(&self) -> usize {
        let now = Timestamp::now();
        self.data
            .read()
            .values()
            .filter(|set| !set.is_expired_at(now))
            .count()
    }

    /// True if no live keys remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys physically held, including expired ones not yet purged
    pub fn physical_len(&self) -> usize {
        self.data.read().len()
    }

    /// Remove every set whose deadline has passed
    ///
    /// Returns the number of keys reclaimed.
    pub fn purge_expired(&self) -> usize {
        let now = Timestamp::now();
        let mut data = self.data.write();
        let mut ttl_index = self.ttl_index.write();

        let mut purged = 0;
        for key in ttl_index.find_expired(now) {
            if data.get(&key).map_or(false, |set| set.is_expired_at(now)) {
                data.remove(&key);
                purged += 1;
            }
        }
        ttl_index.remove_expired(now);
        purged
    }

    /// Simulate losing the connection: all later calls fail
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::Unavailable("memory store is closed".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SetStore for MemoryStore {
    fn execute(&self, pipeline: Pipeline) -> Result<Vec<Reply>> {
        self.check_open()?;
        if let Err(e) = validate(pipeline.commands()) {
            warn!(target: "sift::store", error = %e, "Pipeline rejected");
            return Err(e);
        }

        let commands = pipeline.into_commands();
        let count = commands.len();

        // Acquire ALL locks ONCE for the entire batch
        let mut data = self.data.write();
        let mut ttl_index = self.ttl_index.write();
        let now = Timestamp::now();

        let mut replies = Vec::with_capacity(count);
        for command in commands {
            replies.push(apply(&mut data, &mut ttl_index, command, now));
        }

        self.commands_executed
            .fetch_add(count as u64, Ordering::AcqRel);
        debug!(target: "sift::store", commands = count, "Pipeline applied");
        Ok(replies)
    }

    fn members(&self, key: &SetKey) -> Result<HashSet<String>> {
        self.check_open()?;
        let now = Timestamp::now();
        let data = self.data.read();
        Ok(live(&data, key, now)
            .map(|set| set.members().clone())
            .unwrap_or_default())
    }

    fn cardinality(&self, key: &SetKey) -> Result<usize> {
        self.check_open()?;
        let now = Timestamp::now();
        let data = self.data.read();
        Ok(live(&data, key, now).map_or(0, |set| set.members().len()))
    }

    fn exists(&self, key: &SetKey) -> Result<bool> {
        self.check_open()?;
        let now = Timestamp::now();
        Ok(live(&self.data.read(), key, now).is_some())
    }

    fn ttl(&self, key: &SetKey) -> Result<Option<Duration>> {
        self.check_open()?;
        let now = Timestamp::now();
        Ok(live(&self.data.read(), key, now).and_then(|set| set.remaining_ttl(now)))
    }
}

/// Reject the whole batch if any command is malformed
fn validate(commands: &[Command]) -> Result<()> {
    for (index, command) in commands.iter().enumerate() {
        let reason = match command {
            Command::AddMembers { key, members } if members.is_empty() => {
                format!("add-members on '{}' has no members", key)
            }
            Command::StoreSetOp { op, sources, .. } if sources.is_empty() => {
                format!("{} requires at least one source key", op.command_name())
            }
            Command::Expire { key, ttl } if ttl.is_zero() => {
                format!("expire on '{}' requires a positive ttl", key)
            }
            _ => continue,
        };
        return Err(Error::CommandFailed { index, reason });
    }
    Ok(())
}

fn live<'a>(
    data: &'a HashMap<SetKey, StoredSet>,
    key: &SetKey,
    now: Timestamp,
) -> Option<&'a StoredSet> {
    data.get(key).filter(|set| !set.is_expired_at(now))
}

fn remove_key(data: &mut HashMap<SetKey, StoredSet>, ttl_index: &mut TTLIndex, key: &SetKey) {
    if let Some(old) = data.remove(key) {
        if let Some(deadline) = old.expires_at() {
            ttl_index.remove(deadline, key);
        }
    }
}

fn apply(
    data: &mut HashMap<SetKey, StoredSet>,
    ttl_index: &mut TTLIndex,
    command: Command,
    now: Timestamp,
) -> Reply {
    match command {
        Command::AddMembers { key, members } => {
            if data.get(&key).map_or(false, |set| set.is_expired_at(now)) {
                remove_key(data, ttl_index, &key);
            }
            let set = data.entry(key).or_default();
            let mut added = 0;
            for member in members {
                if set.insert(member) {
                    added += 1;
                }
            }
            added
        }
        Command::StoreSetOp { op, dest, sources } => {
            let result = combine(op, data, &sources, now);
            remove_key(data, ttl_index, &dest);
            let cardinality = result.len() as Reply;
            if !result.is_empty() {
                data.insert(dest, StoredSet::new(result));
            }
            cardinality
        }
        Command::Expire { key, ttl } => match data.get_mut(&key) {
            Some(set) if !set.is_expired_at(now) => {
                if let Some(previous) = set.expire_after(now, ttl) {
                    ttl_index.remove(previous, &key);
                }
                if let Some(deadline) = set.expires_at() {
                    ttl_index.insert(deadline, key);
                }
                1
            }
            _ => 0,
        },
    }
}

fn combine(
    op: SetOp,
    data: &HashMap<SetKey, StoredSet>,
    sources: &[SetKey],
    now: Timestamp,
) -> HashSet<String> {
    let empty = HashSet::new();
    let mut operands = sources
        .iter()
        .map(|key| live(data, key, now).map_or(&empty, StoredSet::members));
    let first = operands.next().cloned().unwrap_or_default();

    match op {
        SetOp::Intersect => operands.fold(first, |mut acc, set| {
            acc.retain(|member| set.contains(member));
            acc
        }),
        SetOp::Union => operands.fold(first, |mut acc, set| {
            acc.extend(set.iter().cloned());
            acc
        }),
        SetOp::Difference => operands.fold(first, |mut acc, set| {
            acc.retain(|member| !set.contains(member));
            acc
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn key(name: &str) -> SetKey {
        SetKey::for_name(name)
    }

    fn seed(store: &MemoryStore, name: &str, members: &[&str]) {
        store.add_members(key(name), members).unwrap();
    }

    fn sorted(set: HashSet<String>) -> Vec<String> {
        let mut v: Vec<String> = set.into_iter().collect();
        v.sort();
        v
    }

    #[test]
    fn test_add_members_counts_new_only() {
        let store = MemoryStore::new();
        assert_eq!(store.add_members(key("redis"), &["doc1", "doc2"]).unwrap(), 2);
        assert_eq!(store.add_members(key("redis"), &["doc2", "doc3"]).unwrap(), 1);
        assert_eq!(store.cardinality(&key("redis")).unwrap(), 3);
    }

    #[test]
    fn test_intersect_union_difference() {
        let store = MemoryStore::new();
        seed(&store, "a", &["1", "2", "3"]);
        seed(&store, "b", &["2", "3", "4"]);
        seed(&store, "c", &["3"]);

        let n = store
            .store_set_op(SetOp::Intersect, key("i"), vec![key("a"), key("b")])
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(sorted(store.members(&key("i")).unwrap()), vec!["2", "3"]);

        store
            .store_set_op(SetOp::Union, key("u"), vec![key("a"), key("b")])
            .unwrap();
        assert_eq!(
            sorted(store.members(&key("u")).unwrap()),
            vec!["1", "2", "3", "4"]
        );

        // First source minus the union of the others
        store
            .store_set_op(SetOp::Difference, key("d"), vec![key("a"), key("b"), key("c")])
            .unwrap();
        assert_eq!(sorted(store.members(&key("d")).unwrap()), vec!["1"]);
    }

    #[test]
    fn test_missing_source_behaves_as_empty_set() {
        let store = MemoryStore::new();
        seed(&store, "a", &["1"]);
        let n = store
            .store_set_op(SetOp::Intersect, key("i"), vec![key("a"), key("nope")])
            .unwrap();
        assert_eq!(n, 0);
        // Empty results leave no key behind
        assert!(!store.exists(&key("i")).unwrap());
    }

    #[test]
    fn test_set_op_overwrites_destination_and_clears_ttl() {
        let store = MemoryStore::new();
        seed(&store, "a", &["1"]);
        seed(&store, "dest", &["old"]);
        assert!(store.expire(key("dest"), Duration::from_secs(60)).unwrap());

        store
            .store_set_op(SetOp::Union, key("dest"), vec![key("a")])
            .unwrap();
        assert_eq!(sorted(store.members(&key("dest")).unwrap()), vec!["1"]);
        assert_eq!(store.ttl(&key("dest")).unwrap(), None);
    }

    #[test]
    fn test_expire_missing_key_returns_false() {
        let store = MemoryStore::new();
        assert!(!store.expire(key("ghost"), Duration::from_secs(1)).unwrap());
    }

    #[test]
    fn test_key_expires_after_ttl() {
        let store = MemoryStore::new();
        seed(&store, "tmp", &["doc1"]);
        store.expire(key("tmp"), Duration::from_millis(100)).unwrap();

        assert!(store.exists(&key("tmp")).unwrap());
        let remaining = store.ttl(&key("tmp")).unwrap().unwrap();
        assert!(remaining <= Duration::from_millis(100));

        thread::sleep(Duration::from_millis(150));
        assert!(!store.exists(&key("tmp")).unwrap());
        assert!(store.members(&key("tmp")).unwrap().is_empty());
        // Still physically present until purged
        assert_eq!(store.physical_len(), 1);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.physical_len(), 0);
    }

    #[test]
    fn test_expired_source_is_ignored_by_set_ops() {
        let store = MemoryStore::new();
        seed(&store, "a", &["1"]);
        seed(&store, "b", &["1"]);
        store.expire(key("b"), Duration::from_millis(50)).unwrap();
        thread::sleep(Duration::from_millis(80));

        let n = store
            .store_set_op(SetOp::Intersect, key("i"), vec![key("a"), key("b")])
            .unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_add_to_expired_key_starts_fresh() {
        let store = MemoryStore::new();
        seed(&store, "a", &["old"]);
        store.expire(key("a"), Duration::from_millis(50)).unwrap();
        thread::sleep(Duration::from_millis(80));

        seed(&store, "a", &["new"]);
        assert_eq!(sorted(store.members(&key("a")).unwrap()), vec!["new"]);
        assert_eq!(store.ttl(&key("a")).unwrap(), None);
    }

    #[test]
    fn test_pipeline_is_all_or_nothing() {
        let store = MemoryStore::new();
        let mut pipe = Pipeline::new();
        pipe.add_members(key("a"), ["doc1"])
            .store_set_op(SetOp::Union, key("u"), vec![]);

        let err = store.execute(pipe).unwrap_err();
        assert_eq!(err.command_index(), Some(1));
        // First command was not applied either
        assert!(!store.exists(&key("a")).unwrap());
        assert_eq!(store.commands_executed(), 0);
    }

    #[test]
    fn test_pipeline_replies_in_order() {
        let store = MemoryStore::new();
        let mut pipe = Pipeline::new();
        pipe.add_members(key("a"), ["1", "2"])
            .add_members(key("b"), ["2"])
            .store_set_op(SetOp::Intersect, key("i"), vec![key("a"), key("b")])
            .expire(key("i"), Duration::from_secs(30))
            .expire(key("missing"), Duration::from_secs(30));

        assert_eq!(store.execute(pipe).unwrap(), vec![2, 1, 1, 1, 0]);
        assert_eq!(store.commands_executed(), 5);
    }

    #[test]
    fn test_empty_pipeline_succeeds() {
        let store = MemoryStore::new();
        assert!(store.execute(Pipeline::new()).unwrap().is_empty());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let store = MemoryStore::new();
        seed(&store, "a", &["1"]);
        let err = store.expire(key("a"), Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { index: 0, .. }));
    }

    #[test]
    fn test_closed_store_is_unavailable() {
        let store = MemoryStore::new();
        store.close();
        assert!(matches!(
            store.add_members(key("a"), &["1"]),
            Err(Error::Unavailable(_))
        ));
        assert!(matches!(store.exists(&key("a")), Err(Error::Unavailable(_))));
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemoryStore>();
    }
}
