//! The set-store capability
//!
//! The search layer never owns its storage. It receives a handle
//! implementing [`SetStore`] and expresses every mutation as a
//! [`Pipeline`] submitted through [`SetStore::execute`]. An in-process
//! implementation lives in `sift-storage`; a networked set store can be
//! plugged in by implementing this trait.

use std::collections::HashSet;
use std::time::Duration;

use crate::command::{Pipeline, Reply, SetOp};
use crate::error::{Error, Result};
use crate::key::SetKey;

/// Store offering atomic set operations with key expiry
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait SetStore: Send + Sync {
    /// Submit a pipeline atomically
    ///
    /// Either every command is applied and one [`Reply`] per command is
    /// returned in order, or none is applied and an error is returned.
    /// An empty pipeline succeeds with no replies.
    ///
    /// # Errors
    ///
    /// Returns `Error::CommandFailed` naming the first rejected command, or
    /// `Error::Unavailable` if the batch could not be submitted at all.
    fn execute(&self, pipeline: Pipeline) -> Result<Vec<Reply>>;

    /// Members of a live set (empty if absent or expired)
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn members(&self, key: &SetKey) -> Result<HashSet<String>>;

    /// Number of members of a live set
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn cardinality(&self, key: &SetKey) -> Result<usize> {
        Ok(self.members(key)?.len())
    }

    /// Whether the key currently exists
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn exists(&self, key: &SetKey) -> Result<bool>;

    /// Remaining time-to-live, `None` if the key is absent or persistent
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn ttl(&self, key: &SetKey) -> Result<Option<Duration>>;

    /// Add members to a set in a single-command pipeline
    ///
    /// Returns how many members were newly added.
    ///
    /// # Errors
    ///
    /// Propagates the pipeline failure.
    fn add_members(&self, key: SetKey, members: &[&str]) -> Result<Reply> {
        let mut pipe = Pipeline::new();
        pipe.add_members(key, members.iter().copied());
        single_reply(self.execute(pipe)?)
    }

    /// Run one set operation in a single-command pipeline
    ///
    /// Returns the cardinality of `dest`.
    ///
    /// # Errors
    ///
    /// Propagates the pipeline failure.
    fn store_set_op(&self, op: SetOp, dest: SetKey, sources: Vec<SetKey>) -> Result<Reply> {
        let mut pipe = Pipeline::new();
        pipe.store_set_op(op, dest, sources);
        single_reply(self.execute(pipe)?)
    }

    /// Set a TTL on an existing key
    ///
    /// Returns true if the key existed.
    ///
    /// # Errors
    ///
    /// Propagates the pipeline failure.
    fn expire(&self, key: SetKey, ttl: Duration) -> Result<bool> {
        let mut pipe = Pipeline::new();
        pipe.expire(key, ttl);
        Ok(single_reply(self.execute(pipe)?)? == 1)
    }
}

fn single_reply(replies: Vec<Reply>) -> Result<Reply> {
    replies.into_iter().next().ok_or_else(|| {
        Error::InvalidOperation("store returned no reply for a one-command pipeline".into())
    })
}

impl<T: SetStore + ?Sized> SetStore for std::sync::Arc<T> {
    fn execute(&self, pipeline: Pipeline) -> Result<Vec<Reply>> {
        (**self).execute(pipeline)
    }

    fn members(&self, key: &SetKey) -> Result<HashSet<String>> {
        (**self).members(key)
    }

    fn cardinality(&self, key: &SetKey) -> Result<usize> {
        (**self).cardinality(key)
    }

    fn exists(&self, key: &SetKey) -> Result<bool> {
        (**self).exists(key)
    }

    fn ttl(&self, key: &SetKey) -> Result<Option<Duration>> {
        (**self).ttl(key)
    }
}
