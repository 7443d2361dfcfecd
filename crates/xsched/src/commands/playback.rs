//! Playback command handlers.

use xsched_core::{Command as CoreCommand, Controller};

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::util;

pub async fn play(
    controller: &Controller,
    playlist: String,
    step: Option<String>,
    looped: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let done = match step {
        Some(ref step) => format!("Playing step '{step}' of '{playlist}'"),
        None => format!("Playing '{playlist}'"),
    };
    let command = match step {
        Some(step) => CoreCommand::PlayStep {
            playlist,
            step,
            looped,
        },
        None => CoreCommand::PlayPlaylist { playlist, looped },
    };
    util::run(controller, command, &done, global).await
}

pub async fn resume(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::run(controller, CoreCommand::Resume, "Resumed", global).await
}

pub async fn pause(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::run(controller, CoreCommand::PauseToggle, "Pause toggled", global).await
}

pub async fn stop(controller: &Controller, all: bool, global: &GlobalOpts) -> Result<(), CliError> {
    if all {
        util::run(controller, CoreCommand::StopAll, "Stopped everything", global).await
    } else {
        util::run(controller, CoreCommand::Stop, "Stopped", global).await
    }
}

pub async fn next(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::run(controller, CoreCommand::NextStep, "Skipped to next step", global).await
}

pub async fn prior(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::run(controller, CoreCommand::PriorStep, "Back to previous step", global).await
}

pub async fn restart(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::run(controller, CoreCommand::RestartStep, "Step restarted", global).await
}

pub async fn seek(
    controller: &Controller,
    position_ms: i64,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if position_ms < 0 {
        return Err(CliError::Validation {
            field: "position".into(),
            reason: "must not be negative".into(),
        });
    }
    util::run(
        controller,
        CoreCommand::Seek { position_ms },
        &format!("Moved to {position_ms} ms"),
        global,
    )
    .await
}
