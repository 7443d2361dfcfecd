//! Status command handler.

use std::fmt::Write as _;

use xsched_core::{Controller, PlaybackStatus, StatusSnapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Palette};

pub fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let snap = controller.snapshot().ok_or_else(|| CliError::Protocol {
        message: "no status received".into(),
    })?;
    let palette = Palette::new(output::should_color(&global.color));

    let out = output::render_single(
        &global.output,
        snap.as_ref(),
        |s| detail(s, palette),
        |s| s.status.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Multi-line human view of a snapshot.
pub fn detail(s: &StatusSnapshot, p: Palette) -> String {
    let mut out = String::new();
    let status = match s.status {
        PlaybackStatus::Playing => Palette::paint(p.good, "playing"),
        PlaybackStatus::Paused => Palette::paint(p.warn, "paused"),
        PlaybackStatus::Idle => Palette::paint(p.dim, "idle"),
    };
    let _ = writeln!(out, "{} {status}", Palette::paint(p.label, "Status:    "));

    if s.is_active() {
        let playlist = s.playlist.as_deref().unwrap_or("-");
        let looping = if s.playlist_looping { " (looping)" } else { "" };
        let _ = writeln!(
            out,
            "{} {}{looping}",
            Palette::paint(p.label, "Playlist:  "),
            Palette::paint(p.accent, playlist)
        );
        let _ = writeln!(
            out,
            "{} {}  {} / {}",
            Palette::paint(p.label, "Step:      "),
            s.step.as_deref().unwrap_or("-"),
            output::format_ms(s.position_ms),
            output::format_ms(s.length_ms)
        );
        if let Some(ref next) = s.next_step {
            let _ = writeln!(out, "{} {next}", Palette::paint(p.label, "Next step: "));
        }
        if let Some(schedule) = s.active_schedule_id() {
            let name = s.schedule_name.as_deref().unwrap_or(schedule);
            let end = s
                .schedule_end
                .as_deref()
                .map(|e| format!(" until {e}"))
                .unwrap_or_default();
            let _ = writeln!(out, "{} {name}{end}", Palette::paint(p.label, "Schedule:  "));
        }
    } else if let Some(next) = s.next_scheduled.as_ref().filter(|n| !n.is_empty()) {
        let _ = writeln!(
            out,
            "{} {} at {}",
            Palette::paint(p.label, "Next show: "),
            next.playlist_name.as_deref().unwrap_or("-"),
            next.start.as_deref().unwrap_or("?")
        );
    }

    let lights = if s.output_to_lights {
        Palette::paint(p.good, "on")
    } else {
        Palette::paint(p.warn, "off")
    };
    let _ = writeln!(out, "{} {lights}", Palette::paint(p.label, "Output:    "));
    let _ = writeln!(
        out,
        "{} {}%   brightness {}%",
        Palette::paint(p.label, "Volume:    "),
        s.volume,
        s.brightness
    );
    if let Some(ref version) = s.version {
        let _ = write!(out, "{} {version}", Palette::paint(p.dim, "xSchedule  "));
    }
    out.trim_end().to_owned()
}
