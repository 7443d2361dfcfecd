//! `watch`: stream edge events and status changes until Ctrl-C.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use xsched_core::{Controller, SchedulerEvent, StatusSnapshot};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output::{self, Palette};

/// `events` should be subscribed before `connect()`, or the first
/// cycle's events are missed.
pub async fn handle(
    controller: &Controller,
    mut events: broadcast::Receiver<Arc<SchedulerEvent>>,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let palette = Palette::new(output::should_color(&global.color));
    let mut snapshots = controller.snapshots();

    if !args.events_only {
        if let Some(snap) = snapshots.current() {
            output::print_output(&status_line(snap, &global.output, palette), global.quiet);
        }
    }
    if !global.quiet {
        eprintln!("Watching {} (Ctrl-C to stop)", controller.config().url);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            event = events.recv() => match event {
                Ok(event) => {
                    output::print_output(&event_line(&event, &global.output, palette), global.quiet);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },

            snap = snapshots.changed(), if !args.events_only => match snap {
                Some(snap) => {
                    output::print_output(&status_line(&snap, &global.output, palette), global.quiet);
                }
                None => break,
            },
        }
    }

    let status = controller.update_status();
    if let Some(ref error) = status.last_error {
        tracing::debug!(error, failures = status.consecutive_failures, "last poll error");
    }
    Ok(())
}

fn timestamp(p: Palette) -> String {
    Palette::paint(p.dim, &Local::now().format("%H:%M:%S").to_string())
}

fn event_line(event: &SchedulerEvent, format: &OutputFormat, p: Palette) -> String {
    match format {
        OutputFormat::Table => format!(
            "{} {} {}",
            timestamp(p),
            Palette::paint(p.accent, event.name()),
            event_detail(event)
        ),
        OutputFormat::Plain => event.name().to_owned(),
        // One document per line so the stream stays parseable.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(event),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(event).trim_end()),
    }
}

fn event_detail(event: &SchedulerEvent) -> String {
    match event {
        SchedulerEvent::VersionChanged { version, previous } => match previous {
            Some(previous) => format!("{previous} -> {version}"),
            None => version.clone(),
        },
        SchedulerEvent::ScheduleStarted {
            schedule_id,
            schedule_name,
            ..
        } => schedule_name.clone().unwrap_or_else(|| schedule_id.clone()),
        SchedulerEvent::ScheduleEnded { schedule_id } => schedule_id.clone(),
        SchedulerEvent::PlaylistStarted { playlist, .. }
        | SchedulerEvent::PlaylistEnded { playlist, .. } => playlist.clone(),
        SchedulerEvent::StepChanged { step, playlist, .. } => format!(
            "{} ({})",
            step.as_deref().unwrap_or("-"),
            playlist.as_deref().unwrap_or("-")
        ),
        SchedulerEvent::OutputToggled { state, .. } => {
            (if *state { "on" } else { "off" }).to_owned()
        }
        SchedulerEvent::PlaylistLoopChanged { looping, .. } => {
            (if *looping { "looping" } else { "not looping" }).to_owned()
        }
        SchedulerEvent::TestModeStarted { mode } => mode.clone(),
        SchedulerEvent::TestModeStopped => String::new(),
    }
}

fn status_line(snap: &StatusSnapshot, format: &OutputFormat, p: Palette) -> String {
    match format {
        OutputFormat::Table | OutputFormat::Plain => {
            let what = match (&snap.playlist, &snap.step) {
                (Some(playlist), Some(step)) if snap.is_active() => format!(
                    "{playlist} / {step} {}/{}",
                    output::format_ms(snap.position_ms),
                    output::format_ms(snap.length_ms)
                ),
                (Some(playlist), None) if snap.is_active() => playlist.clone(),
                _ => String::new(),
            };
            format!("{} {} {what}", timestamp(p), Palette::paint(p.label, &snap.status.to_string()))
                .trim_end()
                .to_owned()
        }
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(snap),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(snap).trim_end()),
    }
}
