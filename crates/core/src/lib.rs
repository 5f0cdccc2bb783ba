//! Core types and traits for sift
//!
//! This crate defines the foundational types shared by the store and the
//! search layer:
//! - SetKey / ResultSetId: `idx:`-prefixed key naming
//! - SetOp, Command, Pipeline: atomic command batches
//! - SetStore: the store capability trait
//! - Timestamp: expiry deadlines
//! - SiftConfig: `sift.toml` configuration
//! - Error: store-level error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod error;
pub mod key;
pub mod timestamp;
pub mod traits;

pub use command::{Command, Pipeline, Reply, SetOp};
pub use config::SiftConfig;
pub use error::{Error, Result};
pub use key::{ResultSetId, SetKey, INDEX_PREFIX};
pub use timestamp::Timestamp;
pub use traits::SetStore;
