//! Error types for the sift store layer
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//! Search-level failures (indexing, evaluation) wrap these in
//! `sift_search::SearchError`.

use std::io;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by a `SetStore` implementation or by configuration loading
#[derive(Debug, Error)]
pub enum Error {
    /// A command inside a submitted pipeline was rejected
    ///
    /// The whole pipeline is discarded; `index` is the position of the
    /// offending command within the batch.
    #[error("Command {index} rejected: {reason}")]
    CommandFailed {
        /// Position of the command in the pipeline
        index: usize,
        /// Why the store refused it
        reason: String,
    },

    /// The store could not be reached or has been shut down
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Index of the failing command, if the store reported one
    pub fn command_index(&self) -> Option<usize> {
        match self {
            Error::CommandFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}
