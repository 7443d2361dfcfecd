//! Playlist command handlers.

use tabled::Tabled;
use xsched_core::{Controller, Playlist, PlaylistStep};

use crate::cli::{GlobalOpts, PlaylistsArgs, PlaylistsCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlaylistRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Length")]
    length: String,
    #[tabled(rename = "Next scheduled")]
    next_scheduled: String,
}

impl From<&Playlist> for PlaylistRow {
    fn from(p: &Playlist) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            length: output::format_ms(p.length_ms),
            next_scheduled: p.next_scheduled.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Length")]
    length: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

impl From<&PlaylistStep> for StepRow {
    fn from(s: &PlaylistStep) -> Self {
        let flags: Vec<&str> = [
            (s.start_only, "start-only"),
            (s.end_only, "end-only"),
            (s.every_step, "every-step"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            length: output::format_ms(s.length_ms),
            flags: flags.join(","),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: PlaylistsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PlaylistsCommand::List => {
            let playlists = controller
                .snapshot()
                .map(|s| s.playlists.clone())
                .unwrap_or_default();
            let out = output::render_list(
                &global.output,
                playlists.as_slice(),
                |p| PlaylistRow::from(p),
                |p| p.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PlaylistsCommand::Steps { playlist } => {
            let known = controller
                .snapshot()
                .and_then(|s| s.find_playlist(&playlist).map(|p| p.name.clone()));
            let steps = controller
                .get_steps(known.as_deref().unwrap_or(&playlist))
                .await?;
            let out = output::render_list(
                &global.output,
                steps.as_slice(),
                |s| StepRow::from(s),
                |s| s.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
