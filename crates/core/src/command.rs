//! Store commands and pipelines
//!
//! A [`Pipeline`] is an ordered batch of [`Command`]s that a `SetStore`
//! applies atomically. Set-algebra operations are selected through the
//! [`SetOp`] tag rather than by command name, so every variant maps to
//! exactly one store-native multi-way operation.

use std::fmt;
use std::time::Duration;

use crate::key::SetKey;

/// Store-native set operation that writes its result to a destination key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOp {
    /// `SINTERSTORE`: members present in every source
    Intersect,
    /// `SUNIONSTORE`: members present in any source
    Union,
    /// `SDIFFSTORE`: members of the first source absent from all others
    Difference,
}

impl SetOp {
    /// Native command name of this operation
    pub fn command_name(self) -> &'static str {
        match self {
            SetOp::Intersect => "SINTERSTORE",
            SetOp::Union => "SUNIONSTORE",
            SetOp::Difference => "SDIFFSTORE",
        }
    }
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SetOp::Intersect => "intersect",
            SetOp::Union => "union",
            SetOp::Difference => "difference",
        };
        f.write_str(s)
    }
}

/// A single store command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add members to a set, creating it if needed
    AddMembers {
        /// Set to add to
        key: SetKey,
        /// Members to add
        members: Vec<String>,
    },
    /// Compute a set operation over `sources` and store it at `dest`
    StoreSetOp {
        /// Which operation
        op: SetOp,
        /// Destination key (overwritten)
        dest: SetKey,
        /// Source keys, in order
        sources: Vec<SetKey>,
    },
    /// Set a time-to-live on an existing key
    Expire {
        /// Key to expire
        key: SetKey,
        /// Time until the key is reclaimed
        ttl: Duration,
    },
}

/// Per-command reply: an integer count, as a set store reports it
///
/// - `AddMembers`: members newly added
/// - `StoreSetOp`: cardinality of the destination
/// - `Expire`: 1 if the TTL was set, 0 if the key does not exist
pub type Reply = u64;

/// Ordered batch of commands submitted as one atomic unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    commands: Vec<Command>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an add-members command
    pub fn add_members<I, M>(&mut self, key: SetKey, members: I) -> &mut Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.commands.push(Command::AddMembers {
            key,
            members: members.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Queue a store-native set operation
    pub fn store_set_op(&mut self, op: SetOp, dest: SetKey, sources: Vec<SetKey>) -> &mut Self {
        self.commands.push(Command::StoreSetOp { op, dest, sources });
        self
    }

    /// Queue an expire command
    pub fn expire(&mut self, key: SetKey, ttl: Duration) -> &mut Self {
        self.commands.push(Command::Expire { key, ttl });
        self
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if nothing has been queued
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Queued commands in submission order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Consume the pipeline, yielding its commands
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}
