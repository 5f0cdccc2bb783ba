//! Storage-layer set with optional expiry deadline

use std::collections::HashSet;
use std::time::Duration;

use sift_core::Timestamp;

/// A stored set of members with an optional deadline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSet {
    members: HashSet<String>,
    expires_at: Option<Timestamp>,
}

impl StoredSet {
    /// Create a persistent set
    pub fn new(members: HashSet<String>) -> Self {
        StoredSet {
            members,
            expires_at: None,
        }
    }

    /// Members of the set
    #[inline]
    pub fn members(&self) -> &HashSet<String> {
        &self.members
    }

    /// Add a member, returning true if it was not present
    pub fn insert(&mut self, member: String) -> bool {
        self.members.insert(member)
    }

    /// Expiry deadline, if a TTL was set
    #[inline]
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Arm the deadline `ttl` after `now`, returning the previous deadline
    pub fn expire_after(&mut self, now: Timestamp, ttl: Duration) -> Option<Timestamp> {
        self.expires_at.replace(now.saturating_add(ttl))
    }

    /// Whether the deadline has been reached at `now`
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }

    /// Remaining lifetime at `now`; `None` for persistent or expired sets
    pub fn remaining_ttl(&self, now: Timestamp) -> Option<Duration> {
        self.expires_at.and_then(|deadline| now.duration_until(deadline))
    }
}
