//! TTL Cleanup Task
//!
//! Background task that periodically purges expired keys from a [`MemoryStore`].
//! Redis expires keys itself, so this only runs for the memory backend.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically removes expired entries.
///
/// The task runs until aborted, sleeping for the specified interval between
/// passes. Expired keys are already invisible to reads; this bounds memory.
///
/// # Arguments
/// * `store` - Shared memory store handle
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = MemoryStore::new();
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: MemoryStore, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
