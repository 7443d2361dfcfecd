// Wire models for the list-style queries.
//
// Every field goes through the lenient decoders so that a server sending
// numbers as strings (or omitting fields) still parses.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// One entry of `GetPlayLists`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, rename = "lengthms", deserialize_with = "lenient::uint")]
    pub length_ms: u64,
    #[serde(default, rename = "nextscheduled", deserialize_with = "lenient::opt_string")]
    pub next_scheduled: Option<String>,
}

/// One entry of `GetPlayListSteps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistStep {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, rename = "lengthms", deserialize_with = "lenient::uint")]
    pub length_ms: u64,
    #[serde(default, rename = "startonly", deserialize_with = "lenient::flag")]
    pub start_only: bool,
    #[serde(default, rename = "endonly", deserialize_with = "lenient::flag")]
    pub end_only: bool,
    #[serde(default, rename = "everystep", deserialize_with = "lenient::flag")]
    pub every_step: bool,
}

/// Reply of `GetNextScheduledPlayList`. All fields are absent when nothing
/// is scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextScheduled {
    #[serde(default, rename = "playlistname", deserialize_with = "lenient::opt_string")]
    pub playlist_name: Option<String>,
    #[serde(default, rename = "playlistid", deserialize_with = "lenient::opt_string")]
    pub playlist_id: Option<String>,
    #[serde(default, rename = "schedulename", deserialize_with = "lenient::opt_string")]
    pub schedule_name: Option<String>,
    #[serde(default, rename = "scheduleid", deserialize_with = "lenient::opt_string")]
    pub schedule_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub end: Option<String>,
}

impl NextScheduled {
    pub fn is_empty(&self) -> bool {
        self.playlist_name.is_none() && self.schedule_name.is_none()
    }
}

/// Test pattern mode used when none is given.
pub const DEFAULT_TEST_MODE: &str = "Alternate";

/// Arguments of `Start test mode`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestModeRequest {
    /// Pattern name, e.g. `Alternate`, `A-B-C`, `Chase`.
    pub mode: Option<String>,
    pub model: Option<String>,
    pub interval: Option<u32>,
    pub foreground: Option<u32>,
    pub background: Option<u32>,
}

impl TestModeRequest {
    pub fn mode(&self) -> &str {
        self.mode
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_TEST_MODE)
    }

    /// `mode|model|interval|foreground|background`, skipping absent parts.
    pub fn parameters(&self) -> String {
        let mut parts = vec![self.mode().to_owned()];
        if let Some(model) = self.model.as_deref().filter(|m| !m.is_empty()) {
            parts.push(model.to_owned());
        }
        parts.extend(
            [self.interval, self.foreground, self.background]
                .into_iter()
                .flatten()
                .map(|n| n.to_string()),
        );
        parts.join("|")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn playlist_accepts_stringly_numbers() {
        let pl: Playlist =
            serde_json::from_value(json!({"name": "Xmas", "id": 3, "lengthms": "90000"})).unwrap();
        assert_eq!(
            pl,
            Playlist {
                name: "Xmas".into(),
                id: "3".into(),
                length_ms: 90_000,
                next_scheduled: None,
            }
        );
    }

    #[test]
    fn step_flags_parse_from_text() {
        let step: PlaylistStep = serde_json::from_value(
            json!({"name": "Intro", "id": "1", "startonly": "TRUE", "everystep": "false"}),
        )
        .unwrap();
        assert!(step.start_only);
        assert!(!step.every_step);
        assert!(!step.end_only);
        assert_eq!(step.length_ms, 0);
    }

    #[test]
    fn next_scheduled_empty_strings_are_absent() {
        let next: NextScheduled =
            serde_json::from_value(json!({"playlistname": "", "schedulename": ""})).unwrap();
        assert!(next.is_empty());
    }

    #[test]
    fn test_mode_defaults_to_alternate() {
        assert_eq!(TestModeRequest::default().parameters(), "Alternate");
    }

    #[test]
    fn test_mode_skips_missing_parts() {
        let req = TestModeRequest {
            mode: Some("Chase".into()),
            model: None,
            interval: Some(500),
            foreground: None,
            background: Some(0),
        };
        assert_eq!(req.parameters(), "Chase|500|0");
    }

    #[test]
    fn test_mode_full_parameters() {
        let req = TestModeRequest {
            mode: Some("A-B-C".into()),
            model: Some("Arches".into()),
            interval: Some(1000),
            foreground: Some(16_711_680),
            background: Some(255),
        };
        assert_eq!(req.parameters(), "A-B-C|Arches|1000|16711680|255");
    }
}
