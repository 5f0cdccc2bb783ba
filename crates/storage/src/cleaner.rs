//! TTL cleanup background task
//!
//! `TTLCleaner` runs in a background thread and periodically reclaims
//! expired result sets from a `MemoryStore`. Expired sets are already
//! invisible to readers; the cleaner only bounds memory.
//!
//! # Design Notes
//!
//! - Runs in background thread, doesn't block pipelines for longer than one sweep
//! - Graceful shutdown via atomic flag
//! - Configurable check interval (`cleanup_interval_ms` in `sift.toml`)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::MemoryStore;

/// Shortest interval between sweeps; smaller requests are raised to it
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(1);

/// Background TTL cleanup task
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use std::time::Duration;
/// use sift_storage::{MemoryStore, TTLCleaner};
///
/// let store = Arc::new(MemoryStore::new());
/// let cleaner = TTLCleaner::new(Arc::clone(&store), Duration::from_secs(1));
/// let handle = cleaner.start();
///
/// // ... use the store ...
///
/// cleaner.shutdown();
/// handle.join().unwrap();
/// ```
pub struct TTLCleaner {
    /// Reference to the store to clean
    store: Arc<MemoryStore>,
    /// How often to check for expired keys
    check_interval: Duration,
    /// Shutdown signal
    shutdown: Arc<AtomicBool>,
}

impl TTLCleaner {
    /// Create a new TTL cleaner
    ///
    /// `check_interval` is clamped to at least [`MIN_CHECK_INTERVAL`] so the
    /// sweep loop always sleeps between passes.
    pub fn new(store: Arc<MemoryStore>, check_interval: Duration) -> Self {
        Self {
            store,
            check_interval: check_interval.max(MIN_CHECK_INTERVAL),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Effective interval between sweeps
    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Start the background cleanup task
    ///
    /// The thread runs until `shutdown()` is called.
    pub fn start(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let shutdown = Arc::clone(&self.shutdown);
        let check_interval = self.check_interval;

        info!(target: "sift::store", interval_ms = check_interval.as_millis() as u64, "TTL cleaner started");

        thread::spawn(move || {
            while !shutdown.load(Ordering::Relaxed) {
                // Sleep in short slices so shutdown is noticed promptly
                let sleep_interval = Duration::from_millis(100).min(check_interval);
                let mut elapsed = Duration::ZERO;

                while elapsed < check_interval {
                    if shutdown.load(Ordering::Relaxed) {
                        info!(target: "sift::store", "TTL cleaner stopped");
                        return;
                    }
                    thread::sleep(sleep_interval);
                    elapsed += sleep_interval;
                }

                let purged = store.purge_expired();
                if purged > 0 {
                    debug!(target: "sift::store", purged, "Reclaimed expired keys");
                }
            }
            info!(target: "sift::store", "TTL cleaner stopped");
        })
    }

    /// Signal shutdown
    ///
    /// The background thread exits on its next check.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Check if shutdown has been signaled
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}
