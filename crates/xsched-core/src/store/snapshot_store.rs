// ── Snapshot store ──
//
// The single externally visible state: the latest good snapshot, the
// outcome of the last poll, and the interval the next poll will use.
// Every piece is a `watch` channel so readers never block the poller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::StatusSnapshot;
use crate::stream::SnapshotStream;

/// Health of the poll loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateStatus {
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl UpdateStatus {
    /// The most recent cycle succeeded.
    pub fn is_healthy(&self) -> bool {
        self.consecutive_failures == 0 && self.last_success.is_some()
    }
}

pub struct SnapshotStore {
    current: watch::Sender<Option<Arc<StatusSnapshot>>>,
    update_status: watch::Sender<UpdateStatus>,
    interval: watch::Sender<Duration>,
}

impl SnapshotStore {
    pub fn new(initial_interval: Duration) -> Self {
        let (current, _) = watch::channel(None);
        let (update_status, _) = watch::channel(UpdateStatus::default());
        let (interval, _) = watch::channel(initial_interval);
        Self {
            current,
            update_status,
            interval,
        }
    }

    /// Replace the visible snapshot.
    pub(crate) fn publish(&self, snapshot: Arc<StatusSnapshot>) {
        let at = snapshot.fetched_at;
        self.current.send_replace(Some(snapshot));
        self.update_status.send_modify(|s| {
            s.last_success = Some(at);
            s.last_error = None;
            s.consecutive_failures = 0;
        });
    }

    /// Note a failed cycle. The previous snapshot stays visible.
    pub(crate) fn record_failure(&self, err: &CoreError) {
        self.update_status.send_modify(|s| {
            s.last_error = Some(err.to_string());
            s.consecutive_failures = s.consecutive_failures.saturating_add(1);
        });
    }

    pub(crate) fn set_interval(&self, interval: Duration) {
        self.interval.send_if_modified(|current| {
            let changed = *current != interval;
            *current = interval;
            changed
        });
    }

    pub fn snapshot(&self) -> Option<Arc<StatusSnapshot>> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.current.subscribe())
    }

    pub fn update_status(&self) -> UpdateStatus {
        self.update_status.borrow().clone()
    }

    pub fn interval(&self) -> Duration {
        *self.interval.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_keeps_last_snapshot() {
        let store = SnapshotStore::new(Duration::from_secs(2));
        store.publish(Arc::new(StatusSnapshot::from_raw(json!({"status": "playing"}), Utc::now())));
        store.record_failure(&CoreError::Timeout { timeout_secs: 15 });

        assert!(store.snapshot().is_some_and(|s| s.is_active()));
        let status = store.update_status();
        assert_eq!(status.consecutive_failures, 1);
        assert!(status.last_error.is_some());
        assert!(!status.is_healthy());
    }

    #[test]
    fn success_resets_failures() {
        let store = SnapshotStore::new(Duration::from_secs(2));
        store.record_failure(&CoreError::ControllerDisconnected);
        store.publish(Arc::new(StatusSnapshot::from_raw(json!({}), Utc::now())));
        assert!(store.update_status().is_healthy());
    }
}
