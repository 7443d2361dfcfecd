// ── Scheduler events ──
//
// Edge-triggered notifications derived by diffing consecutive snapshots,
// plus the test-mode pair emitted after successful commands.

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use super::status::PlaybackStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "event", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SchedulerEvent {
    /// First observation of a version, or a change (restart/upgrade).
    VersionChanged {
        version: String,
        previous: Option<String>,
    },
    ScheduleStarted {
        schedule_id: String,
        schedule_name: Option<String>,
        playlist: Option<String>,
        playlist_id: Option<String>,
        schedule_end: Option<String>,
        trigger: Option<String>,
    },
    ScheduleEnded {
        schedule_id: String,
    },
    PlaylistStarted {
        playlist: String,
        playlist_id: Option<String>,
        status: PlaybackStatus,
        trigger: Option<String>,
    },
    /// Carries the *previous* playlist, even when a new one started in the
    /// same cycle.
    PlaylistEnded {
        playlist: String,
        playlist_id: Option<String>,
        status: PlaybackStatus,
    },
    StepChanged {
        playlist: Option<String>,
        playlist_id: Option<String>,
        step: Option<String>,
        step_id: Option<String>,
        previous_step: Option<String>,
        status: PlaybackStatus,
    },
    OutputToggled {
        state: bool,
        playlist: Option<String>,
        playlist_id: Option<String>,
        status: PlaybackStatus,
    },
    PlaylistLoopChanged {
        looping: bool,
        playlist: Option<String>,
        playlist_id: Option<String>,
        status: PlaybackStatus,
    },
    TestModeStarted {
        mode: String,
    },
    TestModeStopped,
}

impl SchedulerEvent {
    /// Stable snake_case name, e.g. `playlist_started`.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_are_snake_case() {
        assert_eq!(SchedulerEvent::TestModeStopped.name(), "test_mode_stopped");
        let ev = SchedulerEvent::ScheduleEnded {
            schedule_id: "4".into(),
        };
        assert_eq!(ev.name(), "schedule_ended");
    }

    #[test]
    fn serializes_with_event_tag() {
        let ev = SchedulerEvent::OutputToggled {
            state: true,
            playlist: Some("Xmas".into()),
            playlist_id: None,
            status: PlaybackStatus::Playing,
        };
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({
                "event": "output_toggled",
                "state": true,
                "playlist": "Xmas",
                "playlist_id": null,
                "status": "playing"
            })
        );
    }
}
