// Typed command wrappers
//
// Pure parameter formatting over `XScheduleClient::command`. Every
// wrapper checks the reply, so a non-"ok" result surfaces as
// `Error::Rejected`.

use serde_json::Value;

use crate::client::{XScheduleClient, check_result};
use crate::error::Error;
use crate::models::TestModeRequest;

/// Clamp an absolute volume or brightness to `0..=100`.
pub fn clamp_percent(value: i64) -> i64 {
    value.clamp(0, 100)
}

/// Clamp a relative volume change to `-100..=100`.
pub fn clamp_delta(delta: i64) -> i64 {
    delta.clamp(-100, 100)
}

/// Clamp a step position to non-negative milliseconds.
pub fn clamp_position(ms: i64) -> i64 {
    ms.max(0)
}

impl XScheduleClient {
    async fn checked(&self, name: &str, parameters: &str) -> Result<Value, Error> {
        check_result(self.command(name, parameters, None).await?)
    }

    // ── Playback ─────────────────────────────────────────────────────

    pub async fn play_playlist(&self, playlist: &str, looped: bool) -> Result<Value, Error> {
        let name = if looped {
            "Play specified playlist looped"
        } else {
            "Play specified playlist"
        };
        self.checked(name, playlist).await
    }

    pub async fn play_playlist_step(&self, playlist: &str, step: &str, looped: bool) -> Result<Value, Error> {
        let name = if looped {
            "Play specified step in specified playlist looped"
        } else {
            "Play playlist step"
        };
        self.checked(name, &format!("{playlist},{step}")).await
    }

    pub async fn stop(&self) -> Result<Value, Error> {
        self.checked("Stop", "").await
    }

    pub async fn stop_all_now(&self) -> Result<Value, Error> {
        self.checked("Stop all now", "").await
    }

    /// The scheduler only exposes a toggle.
    pub async fn pause_toggle(&self) -> Result<Value, Error> {
        self.checked("Pause", "").await
    }

    pub async fn next_step(&self) -> Result<Value, Error> {
        self.checked("Next step in current playlist", "").await
    }

    pub async fn prior_step(&self) -> Result<Value, Error> {
        self.checked("Prior step in current playlist", "").await
    }

    pub async fn restart_step(&self) -> Result<Value, Error> {
        self.checked("Restart step in current playlist", "").await
    }

    pub async fn seek_ms(&self, position_ms: i64) -> Result<Value, Error> {
        self.checked("Set step position ms", &clamp_position(position_ms).to_string())
            .await
    }

    pub async fn toggle_playlist_loop(&self) -> Result<Value, Error> {
        self.checked("Toggle current playlist loop", "").await
    }

    // ── Output ───────────────────────────────────────────────────────

    pub async fn toggle_output_to_lights(&self) -> Result<Value, Error> {
        self.checked("Toggle output to lights", "").await
    }

    pub async fn set_volume(&self, volume: i64) -> Result<Value, Error> {
        self.checked("Set volume to", &clamp_percent(volume).to_string())
            .await
    }

    pub async fn adjust_volume(&self, delta: i64) -> Result<Value, Error> {
        self.checked("Adjust volume by", &clamp_delta(delta).to_string())
            .await
    }

    pub async fn set_brightness(&self, percent: i64) -> Result<Value, Error> {
        self.checked("Set brightness to n%", &clamp_percent(percent).to_string())
            .await
    }

    // ── Test mode ────────────────────────────────────────────────────

    pub async fn start_test_mode(&self, request: &TestModeRequest) -> Result<Value, Error> {
        self.checked("Start test mode", &request.parameters()).await
    }

    pub async fn stop_test_mode(&self) -> Result<Value, Error> {
        self.checked("Stop test mode", "").await
    }

    // ── Background playlist ──────────────────────────────────────────

    pub async fn set_background_playlist(&self, playlist: &str) -> Result<Value, Error> {
        self.checked("Set playlist as background", playlist).await
    }

    pub async fn clear_background_playlist(&self) -> Result<Value, Error> {
        self.checked("Clear background playlist", "").await
    }

    /// Shut the scheduler application down.
    pub async fn close_scheduler(&self) -> Result<Value, Error> {
        self.checked("Close xSchedule", "").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_clamped() {
        assert_eq!(clamp_percent(-5), 0);
        assert_eq!(clamp_percent(55), 55);
        assert_eq!(clamp_percent(250), 100);
    }

    #[test]
    fn delta_is_clamped_both_ways() {
        assert_eq!(clamp_delta(-400), -100);
        assert_eq!(clamp_delta(-10), -10);
        assert_eq!(clamp_delta(101), 100);
    }

    #[test]
    fn position_is_never_negative() {
        assert_eq!(clamp_position(-1), 0);
        assert_eq!(clamp_position(12_000), 12_000);
    }
}
