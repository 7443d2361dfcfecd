// ── Status snapshot ──
//
// One poll cycle's view of the scheduler: the typed `GetPlayingStatus`
// fields plus what the coordinator injects (playlists, fetch time, next
// scheduled playlist). Missing fields fall back to idle / false / zero.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use xsched_api::lenient;
use xsched_api::{NextScheduled, Playlist};

/// Playback state as reported in the `status` field.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl PlaybackStatus {
    /// Unknown or empty text reads as [`PlaybackStatus::Idle`].
    pub fn parse_lenient(text: &str) -> Self {
        text.trim().parse().unwrap_or_default()
    }

    /// Playing or paused: a playlist is loaded.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

/// Schedule ids the scheduler uses to mean "no schedule".
const NO_SCHEDULE: &str = "N/A";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusFields {
    #[serde(deserialize_with = "lenient::string")]
    status: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    playlist: Option<String>,
    #[serde(rename = "playlistid", deserialize_with = "lenient::opt_string")]
    playlist_id: Option<String>,
    #[serde(rename = "playlistlooping", deserialize_with = "lenient::flag")]
    playlist_looping: bool,
    #[serde(deserialize_with = "lenient::opt_string")]
    step: Option<String>,
    #[serde(rename = "stepid", deserialize_with = "lenient::opt_string")]
    step_id: Option<String>,
    #[serde(rename = "steplooping", deserialize_with = "lenient::flag")]
    step_looping: bool,
    #[serde(rename = "lengthms", deserialize_with = "lenient::uint")]
    length_ms: u64,
    #[serde(rename = "positionms", deserialize_with = "lenient::uint")]
    position_ms: u64,
    #[serde(rename = "leftms", deserialize_with = "lenient::uint")]
    left_ms: u64,
    #[serde(deserialize_with = "lenient::opt_string")]
    trigger: Option<String>,
    #[serde(rename = "schedulename", deserialize_with = "lenient::opt_string")]
    schedule_name: Option<String>,
    #[serde(rename = "scheduleid", deserialize_with = "lenient::opt_string")]
    schedule_id: Option<String>,
    #[serde(rename = "scheduleend", deserialize_with = "lenient::opt_string")]
    schedule_end: Option<String>,
    #[serde(rename = "nextstep", deserialize_with = "lenient::opt_string")]
    next_step: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    version: Option<String>,
    #[serde(deserialize_with = "lenient::uint")]
    volume: u64,
    #[serde(deserialize_with = "lenient::uint")]
    brightness: u64,
    #[serde(rename = "outputtolights", deserialize_with = "lenient::flag")]
    output_to_lights: bool,
    #[serde(deserialize_with = "lenient::opt_string")]
    time: Option<String>,
}

/// Immutable result of one successful poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub status: PlaybackStatus,
    pub playlist: Option<String>,
    pub playlist_id: Option<String>,
    pub playlist_looping: bool,
    pub step: Option<String>,
    pub step_id: Option<String>,
    pub step_looping: bool,
    pub length_ms: u64,
    pub position_ms: u64,
    pub left_ms: u64,
    pub trigger: Option<String>,
    pub schedule_name: Option<String>,
    pub schedule_id: Option<String>,
    pub schedule_end: Option<String>,
    pub next_step: Option<String>,
    pub version: Option<String>,
    pub volume: u64,
    pub brightness: u64,
    pub output_to_lights: bool,
    /// Server clock as the scheduler formats it.
    pub time: Option<String>,

    // ── Injected by the coordinator ──────────────────────────────────
    pub playlists: Arc<Vec<Playlist>>,
    pub fetched_at: DateTime<Utc>,
    pub next_scheduled: Option<NextScheduled>,

    /// The status object exactly as received.
    pub raw: Value,
}

impl StatusSnapshot {
    /// Parse a raw status object. Never fails: anything unreadable takes
    /// its neutral default.
    pub fn from_raw(raw: Value, fetched_at: DateTime<Utc>) -> Self {
        let fields: StatusFields = serde_json::from_value(raw.clone()).unwrap_or_default();
        Self {
            status: PlaybackStatus::parse_lenient(&fields.status),
            playlist: fields.playlist,
            playlist_id: fields.playlist_id,
            playlist_looping: fields.playlist_looping,
            step: fields.step,
            step_id: fields.step_id,
            step_looping: fields.step_looping,
            length_ms: fields.length_ms,
            position_ms: fields.position_ms,
            left_ms: fields.left_ms,
            trigger: fields.trigger,
            schedule_name: fields.schedule_name,
            schedule_id: fields.schedule_id,
            schedule_end: fields.schedule_end,
            next_step: fields.next_step,
            version: fields.version,
            volume: fields.volume.min(100),
            brightness: fields.brightness.min(100),
            output_to_lights: fields.output_to_lights,
            time: fields.time,
            playlists: Arc::default(),
            fetched_at,
            next_scheduled: None,
            raw,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The schedule driving playback, if any. Only counts while a playlist
    /// is loaded and the id is a real one.
    pub fn active_schedule_id(&self) -> Option<&str> {
        if !self.is_active() {
            return None;
        }
        self.schedule_id
            .as_deref()
            .filter(|id| !id.eq_ignore_ascii_case(NO_SCHEDULE))
    }

    /// Find a cached playlist by name or id.
    pub fn find_playlist(&self, name_or_id: &str) -> Option<&Playlist> {
        self.playlists
            .iter()
            .find(|p| p.name == name_or_id || p.id == name_or_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(raw: Value) -> StatusSnapshot {
        StatusSnapshot::from_raw(raw, Utc::now())
    }

    #[test]
    fn empty_object_is_neutral() {
        let snap = parse(json!({}));
        assert_eq!(snap.status, PlaybackStatus::Idle);
        assert_eq!(snap.playlist, None);
        assert_eq!(snap.volume, 0);
        assert!(!snap.output_to_lights);
        assert!(!snap.playlist_looping);
        assert!(snap.playlists.is_empty());
        assert!(snap.next_scheduled.is_none());
    }

    #[test]
    fn non_object_is_neutral() {
        let snap = parse(json!("garbage"));
        assert_eq!(snap.status, PlaybackStatus::Idle);
        assert_eq!(snap.raw, json!("garbage"));
    }

    #[test]
    fn typical_playing_status() {
        let snap = parse(json!({
            "status": "Playing",
            "playlist": "Xmas",
            "playlistid": "2",
            "playlistlooping": "TRUE",
            "step": "Carol",
            "stepid": "7",
            "lengthms": "180000",
            "positionms": 45000,
            "volume": "80",
            "outputtolights": "true",
            "scheduleid": "4",
            "schedulename": "Evening",
            "version": "2023.10"
        }));
        assert_eq!(snap.status, PlaybackStatus::Playing);
        assert_eq!(snap.playlist.as_deref(), Some("Xmas"));
        assert!(snap.playlist_looping);
        assert_eq!(snap.step_id.as_deref(), Some("7"));
        assert_eq!(snap.length_ms, 180_000);
        assert_eq!(snap.position_ms, 45_000);
        assert_eq!(snap.volume, 80);
        assert!(snap.output_to_lights);
        assert_eq!(snap.active_schedule_id(), Some("4"));
        assert_eq!(snap.version.as_deref(), Some("2023.10"));
    }

    #[test]
    fn unknown_status_reads_as_idle() {
        assert_eq!(PlaybackStatus::parse_lenient("stopped"), PlaybackStatus::Idle);
        assert_eq!(PlaybackStatus::parse_lenient(" PAUSED "), PlaybackStatus::Paused);
    }

    #[test]
    fn placeholder_schedule_is_not_active() {
        let snap = parse(json!({"status": "playing", "scheduleid": "n/a"}));
        assert_eq!(snap.active_schedule_id(), None);
    }

    #[test]
    fn idle_schedule_is_not_active() {
        let snap = parse(json!({"status": "idle", "scheduleid": "4"}));
        assert_eq!(snap.active_schedule_id(), None);
    }

    #[test]
    fn empty_strings_are_absent() {
        let snap = parse(json!({"status": "idle", "playlist": "", "step": ""}));
        assert_eq!(snap.playlist, None);
        assert_eq!(snap.step, None);
    }
}
