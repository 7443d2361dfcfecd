// ── Poll coordinator ──
//
// One cycle = fetch status, pick the next interval, keep the playlist
// cache fresh, look up the next scheduled playlist, diff against the
// previous cycle and emit events. Cycles take `&mut self`, so whoever owns
// the coordinator decides how they are serialized.

mod derived;
mod edge;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, trace};
use xsched_api::{Playlist, XScheduleClient};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{SchedulerEvent, StatusSnapshot};
use crate::store::TimedCache;

pub use derived::{DEFAULT_UNMUTE_VOLUME, DerivedState, DerivedView};
use edge::EdgeState;

/// Cadence and cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub active: Duration,
    pub idle: Duration,
    pub lists_refresh: Duration,
}

impl From<&ControllerConfig> for PollSettings {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            active: config.poll_interval_active,
            idle: config.poll_interval_idle,
            lists_refresh: config.lists_refresh,
        }
    }
}

/// What a successful cycle produced.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub snapshot: Arc<StatusSnapshot>,
    pub events: Vec<SchedulerEvent>,
}

pub struct PollCoordinator {
    client: Arc<XScheduleClient>,
    settings: PollSettings,
    edge: EdgeState,
    playlists: TimedCache<Vec<Playlist>>,
    next_interval: Duration,
    derived: Arc<DerivedState>,
}

impl PollCoordinator {
    pub fn new(client: Arc<XScheduleClient>, settings: PollSettings) -> Self {
        Self {
            client,
            settings,
            edge: EdgeState::default(),
            playlists: TimedCache::new(),
            next_interval: settings.idle,
            derived: Arc::new(DerivedState::new()),
        }
    }

    /// Shared handle to the volume/playlist memory this coordinator feeds.
    pub fn derived(&self) -> Arc<DerivedState> {
        Arc::clone(&self.derived)
    }

    /// Delay before the next timer-driven cycle.
    pub fn next_interval(&self) -> Duration {
        self.next_interval
    }

    /// Run one cycle.
    ///
    /// A failed status fetch returns [`CoreError::UpdateFailed`] and
    /// leaves every piece of coordinator state untouched. Playlist and
    /// next-scheduled lookups are best effort.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, CoreError> {
        let raw = self
            .client
            .get_playing_status()
            .await
            .map_err(|e| CoreError::UpdateFailed {
                source: Box::new(e.into()),
            })?;
        let mut snapshot = StatusSnapshot::from_raw(raw, Utc::now());

        self.next_interval = if snapshot.is_active() {
            self.settings.active
        } else {
            self.settings.idle
        };
        trace!(status = %snapshot.status, interval = ?self.next_interval, "next poll interval");

        if snapshot
            .version
            .as_deref()
            .is_some_and(|v| self.edge.version() != Some(v))
        {
            debug!(version = ?snapshot.version, "scheduler version changed, playlist cache stale");
            self.playlists.invalidate();
        }

        snapshot.playlists = self.refresh_playlists().await;
        snapshot.next_scheduled = match self.client.get_next_scheduled_playlist().await {
            Ok(next) => Some(next),
            Err(e) => {
                debug!(error = %e, "next scheduled playlist lookup failed");
                None
            }
        };

        let events = edge::derive_events(&self.edge, &snapshot);
        self.edge = self.edge.advance(&snapshot);
        self.derived.observe(&snapshot);

        if !events.is_empty() {
            debug!(count = events.len(), "derived scheduler events");
        }

        Ok(CycleOutcome {
            snapshot: Arc::new(snapshot),
            events,
        })
    }

    /// Cached list, refetched when stale. A failed fetch keeps the old one.
    async fn refresh_playlists(&mut self) -> Arc<Vec<Playlist>> {
        let now = Instant::now();
        if !self
            .playlists
            .is_fresh(now, self.settings.lists_refresh, self.client.session_epoch())
        {
            match self.client.get_playlists().await {
                Ok(list) => {
                    debug!(count = list.len(), "playlist cache refreshed");
                    self.playlists
                        .store(list, now, self.client.session_epoch());
                }
                Err(e) => debug!(error = %e, "playlist refresh failed, keeping cached list"),
            }
        }
        self.playlists.get().cloned().unwrap_or_default()
    }
}
