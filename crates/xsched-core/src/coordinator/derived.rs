// ── Derived state ──
//
// Values remembered across cycles and commands that the scheduler does
// not report itself: the volume to restore on unmute, the playlist to
// resume, whether test mode is on, the background playlist.

use std::sync::RwLock;

use serde::Serialize;

use crate::model::StatusSnapshot;

/// Volume restored on unmute when no non-zero volume was ever seen.
pub const DEFAULT_UNMUTE_VOLUME: u64 = 50;

/// Plain copy of [`DerivedState`] for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedView {
    pub last_nonzero_volume: Option<u64>,
    pub last_playlist: Option<String>,
    pub test_mode: bool,
    pub background_playlist: Option<String>,
}

#[derive(Debug, Default)]
pub struct DerivedState {
    inner: RwLock<DerivedView>,
}

impl DerivedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cycle's snapshot in.
    pub(crate) fn observe(&self, snapshot: &StatusSnapshot) {
        let mut inner = self.inner.write().expect("derived state lock poisoned");
        if snapshot.volume > 0 {
            inner.last_nonzero_volume = Some(snapshot.volume);
        }
        if let Some(playlist) = &snapshot.playlist {
            inner.last_playlist = Some(playlist.clone());
        }
    }

    pub(crate) fn remember_volume(&self, volume: u64) {
        if volume > 0 {
            self.inner
                .write()
                .expect("derived state lock poisoned")
                .last_nonzero_volume = Some(volume);
        }
    }

    pub(crate) fn set_test_mode(&self, on: bool) {
        self.inner.write().expect("derived state lock poisoned").test_mode = on;
    }

    pub(crate) fn set_background_playlist(&self, playlist: Option<String>) {
        self.inner
            .write()
            .expect("derived state lock poisoned")
            .background_playlist = playlist;
    }

    pub fn unmute_volume(&self) -> u64 {
        self.inner
            .read()
            .expect("derived state lock poisoned")
            .last_nonzero_volume
            .unwrap_or(DEFAULT_UNMUTE_VOLUME)
    }

    pub fn last_playlist(&self) -> Option<String> {
        self.inner
            .read()
            .expect("derived state lock poisoned")
            .last_playlist
            .clone()
    }

    pub fn view(&self) -> DerivedView {
        self.inner.read().expect("derived state lock poisoned").clone()
    }
}
