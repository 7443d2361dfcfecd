// ── State storage ──
//
// TTL-gated list caches and the watch-backed snapshot store.

mod cache;
mod snapshot_store;

pub use cache::TimedCache;
pub use snapshot_store::{SnapshotStore, UpdateStatus};
