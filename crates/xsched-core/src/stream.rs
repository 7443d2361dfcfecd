// ── Reactive snapshot stream ──
//
// Subscription to the controller's current snapshot.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::StatusSnapshot;

type Slot = Option<Arc<StatusSnapshot>>;

/// Point-in-time access plus change notification for the snapshot.
pub struct SnapshotStream {
    current: Slot,
    receiver: watch::Receiver<Slot>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<Slot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> Option<&Arc<StatusSnapshot>> {
        self.current.as_ref()
    }

    pub fn latest(&self) -> Slot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next published snapshot. `None` once the controller
    /// is gone.
    pub async fn changed(&mut self) -> Option<Arc<StatusSnapshot>> {
        loop {
            self.receiver.changed().await.ok()?;
            let snap = self.receiver.borrow_and_update().clone();
            self.current.clone_from(&snap);
            if snap.is_some() {
                return snap;
            }
        }
    }

    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding each published snapshot. Starts with the
/// current one, if any.
pub struct SnapshotWatchStream {
    inner: WatchStream<Slot>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<StatusSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Some(snap))) => return Poll::Ready(Some(snap)),
                Poll::Ready(Some(None)) => {}
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use futures_util::StreamExt;
    use serde_json::json;

    use super::*;
    use crate::store::SnapshotStore;

    fn snapshot(playlist: &str) -> Arc<StatusSnapshot> {
        Arc::new(StatusSnapshot::from_raw(
            json!({"status": "playing", "playlist": playlist}),
            Utc::now(),
        ))
    }

    #[test]
    fn stream_skips_empty_slot_and_yields_published() {
        let store = SnapshotStore::new(Duration::from_secs(2));
        let mut stream = store.subscribe().into_stream();
        store.publish(snapshot("Xmas"));

        let first = tokio_test::block_on(stream.next()).unwrap();
        assert_eq!(first.playlist.as_deref(), Some("Xmas"));
    }

    #[test]
    fn stream_ends_with_store() {
        let store = SnapshotStore::new(Duration::from_secs(2));
        let stream = store.subscribe().into_stream();
        drop(store);

        let items: Vec<_> = tokio_test::block_on(stream.collect());
        assert!(items.is_empty());
    }

    #[test]
    fn changed_updates_current() {
        let store = SnapshotStore::new(Duration::from_secs(2));
        let mut sub = store.subscribe();
        assert!(sub.current().is_none());

        store.publish(snapshot("Halloween"));
        let snap = tokio_test::block_on(sub.changed()).unwrap();
        assert_eq!(snap.playlist.as_deref(), Some("Halloween"));
        assert!(sub.current().is_some());
    }
}
