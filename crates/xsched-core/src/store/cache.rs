// ── TTL cache ──
//
// Holds one slow-changing list (playlists, a playlist's steps) together
// with when and under which session epoch it was fetched.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct TimedCache<T> {
    value: Option<Arc<T>>,
    fetched_at: Option<Instant>,
    epoch: u64,
}

impl<T> Default for TimedCache<T> {
    fn default() -> Self {
        Self {
            value: None,
            fetched_at: None,
            epoch: 0,
        }
    }
}

impl<T> TimedCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stored value, fresh or not.
    pub fn get(&self) -> Option<&Arc<T>> {
        self.value.as_ref()
    }

    /// Fetched, no older than `ttl`, and filled under the current session.
    pub fn is_fresh(&self, now: Instant, ttl: Duration, epoch: u64) -> bool {
        self.epoch == epoch
            && self
                .fetched_at
                .is_some_and(|at| now.saturating_duration_since(at) <= ttl)
    }

    pub fn store(&mut self, value: T, now: Instant, epoch: u64) -> Arc<T> {
        let value = Arc::new(value);
        self.value = Some(Arc::clone(&value));
        self.fetched_at = Some(now);
        self.epoch = epoch;
        value
    }

    /// Force the next freshness check to fail. The value stays readable.
    pub fn invalidate(&mut self) {
        self.fetched_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(15);

    #[test]
    fn empty_cache_is_stale() {
        let cache: TimedCache<Vec<u8>> = TimedCache::new();
        assert!(!cache.is_fresh(Instant::now(), TTL, 0));
        assert!(cache.get().is_none());
    }

    #[test]
    fn fresh_until_ttl_elapses() {
        let mut cache = TimedCache::new();
        let t0 = Instant::now();
        cache.store(vec![1], t0, 0);
        assert!(cache.is_fresh(t0 + TTL, TTL, 0));
        assert!(!cache.is_fresh(t0 + TTL + Duration::from_millis(1), TTL, 0));
    }

    #[test]
    fn new_epoch_makes_it_stale() {
        let mut cache = TimedCache::new();
        let t0 = Instant::now();
        cache.store(vec![1], t0, 1);
        assert!(!cache.is_fresh(t0, TTL, 2));
    }

    #[test]
    fn invalidate_keeps_value() {
        let mut cache = TimedCache::new();
        let t0 = Instant::now();
        cache.store(vec![1, 2], t0, 0);
        cache.invalidate();
        assert!(!cache.is_fresh(t0, TTL, 0));
        assert_eq!(cache.get().map(|v| v.len()), Some(2));
    }
}
