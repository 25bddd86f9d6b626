//! TTL Cleanup Task
//!
//! Background task that periodically purges expired values from the
//! in-process store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically removes expired values.
///
/// Reads already skip expired values; this keeps memory from holding on
/// to entries nobody asks for again.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be aborted during
/// graceful shutdown.
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "starting TTL cleanup task"
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
