// ── Edge detection ──
//
// `EdgeState` remembers the previous cycle's derived fields. Events fire
// only on transitions between it and the new snapshot.

use crate::model::{PlaybackStatus, SchedulerEvent, StatusSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct EdgeState {
    status: Option<PlaybackStatus>,
    playlist: Option<String>,
    playlist_id: Option<String>,
    step: Option<String>,
    output: Option<bool>,
    looping: Option<bool>,
    schedule_id: Option<String>,
    version: Option<String>,
}

impl EdgeState {
    pub(crate) fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn was_active(&self) -> bool {
        self.status.is_some_and(PlaybackStatus::is_active)
    }

    /// State to remember after `snapshot`. A cycle without a version keeps
    /// the last one seen.
    pub(crate) fn advance(&self, snapshot: &StatusSnapshot) -> Self {
        Self {
            status: Some(snapshot.status),
            playlist: snapshot.playlist.clone(),
            playlist_id: snapshot.playlist_id.clone(),
            step: snapshot.step.clone(),
            output: Some(snapshot.output_to_lights),
            looping: Some(snapshot.playlist_looping),
            schedule_id: snapshot.active_schedule_id().map(str::to_owned),
            version: snapshot.version.clone().or_else(|| self.version.clone()),
        }
    }
}

/// Events for the transition `prev -> cur`, in emission order.
pub(crate) fn derive_events(prev: &EdgeState, cur: &StatusSnapshot) -> Vec<SchedulerEvent> {
    let mut events = Vec::new();
    let active = cur.is_active();

    if let Some(version) = cur.version.as_deref().filter(|v| prev.version() != Some(*v)) {
        events.push(SchedulerEvent::VersionChanged {
            version: version.to_owned(),
            previous: prev.version.clone(),
        });
    }

    // ── Schedules ────────────────────────────────────────────────────
    let schedule = cur.active_schedule_id();
    if let Some(id) = schedule.filter(|id| prev.schedule_id.as_deref() != Some(*id)) {
        events.push(SchedulerEvent::ScheduleStarted {
            schedule_id: id.to_owned(),
            schedule_name: cur.schedule_name.clone(),
            playlist: cur.playlist.clone(),
            playlist_id: cur.playlist_id.clone(),
            schedule_end: cur.schedule_end.clone(),
            trigger: cur.trigger.clone(),
        });
    }
    if let (None, Some(previous)) = (schedule, &prev.schedule_id) {
        events.push(SchedulerEvent::ScheduleEnded {
            schedule_id: previous.clone(),
        });
    }

    // ── Playlists ────────────────────────────────────────────────────
    let ended = prev
        .playlist
        .as_ref()
        .filter(|previous| prev.was_active() && (cur.playlist.as_ref() != Some(*previous) || !active));
    if let Some(previous) = ended {
        events.push(SchedulerEvent::PlaylistEnded {
            playlist: previous.clone(),
            playlist_id: prev.playlist_id.clone(),
            status: cur.status,
        });
    }
    let started = cur
        .playlist
        .as_ref()
        .filter(|playlist| active && (!prev.was_active() || prev.playlist.as_ref() != Some(*playlist)));
    if let Some(playlist) = started {
        events.push(SchedulerEvent::PlaylistStarted {
            playlist: playlist.clone(),
            playlist_id: cur.playlist_id.clone(),
            status: cur.status,
            trigger: cur.trigger.clone(),
        });
    }

    // ── Step / flags ─────────────────────────────────────────────────
    if cur.step != prev.step {
        events.push(SchedulerEvent::StepChanged {
            playlist: cur.playlist.clone(),
            playlist_id: cur.playlist_id.clone(),
            step: cur.step.clone(),
            step_id: cur.step_id.clone(),
            previous_step: prev.step.clone(),
            status: cur.status,
        });
    }
    if prev.output.is_some_and(|was| was != cur.output_to_lights) {
        events.push(SchedulerEvent::OutputToggled {
            state: cur.output_to_lights,
            playlist: cur.playlist.clone(),
            playlist_id: cur.playlist_id.clone(),
            status: cur.status,
        });
    }
    if prev.looping.is_some_and(|was| was != cur.playlist_looping) {
        events.push(SchedulerEvent::PlaylistLoopChanged {
            looping: cur.playlist_looping,
            playlist: cur.playlist.clone(),
            playlist_id: cur.playlist_id.clone(),
            status: cur.status,
        });
    }

    events
}
