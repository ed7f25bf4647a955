//! Round scheduler: one repeating timer per group driving automatic round
//! rotation.
//!
//! The scheduler owns cancellation. Scheduling a group that already has a
//! timer aborts the old one first, so callers never stack timers; cancel is
//! idempotent and safe for groups that were never scheduled.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Default)]
pub struct RoundScheduler {
    timers: Mutex<HashMap<i64, JoinHandle<()>>>,
}

impl RoundScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a repeating timer for the group. `on_fire` is invoked after
    /// every `interval`; an existing timer for the group is aborted first.
    pub async fn schedule<F, Fut>(&self, group_id: i64, interval: Duration, on_fire: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut timers = self.timers.lock().await;
        if let Some(prev) = timers.remove(&group_id) {
            prev.abort();
            debug!(group_id, "replaced existing rotation timer");
        }
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                on_fire().await;
            }
        });
        timers.insert(group_id, handle);
        info!(group_id, interval_secs = interval.as_secs(), "rotation timer scheduled");
    }

    /// Stop the group's timer. Safe to call when none exists.
    pub async fn cancel(&self, group_id: i64) {
        if let Some(handle) = self.timers.lock().await.remove(&group_id) {
            handle.abort();
            info!(group_id, "rotation timer cancelled");
        }
    }

    /// Whether the group currently has a timer.
    pub async fn is_scheduled(&self, group_id: i64) -> bool {
        self.timers.lock().await.contains_key(&group_id)
    }

    /// Abort every timer. Shutdown path.
    pub async fn cancel_all(&self) {
        let mut timers = self.timers.lock().await;
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }
}
