//! Output-to-lights and playlist-loop handlers.

use xsched_core::{Command as CoreCommand, Controller};

use crate::cli::{GlobalOpts, Switch};
use crate::error::CliError;

use super::util;

pub async fn output(controller: &Controller, state: Switch, global: &GlobalOpts) -> Result<(), CliError> {
    let (command, done) = match state {
        Switch::On => (CoreCommand::SetOutput(true), "Output to lights on"),
        Switch::Off => (CoreCommand::SetOutput(false), "Output to lights off"),
        Switch::Toggle => (CoreCommand::ToggleOutput, "Output to lights toggled"),
    };
    util::run(controller, command, done, global).await
}

pub async fn looping(controller: &Controller, state: Switch, global: &GlobalOpts) -> Result<(), CliError> {
    let (command, done) = match state {
        Switch::On => (CoreCommand::SetPlaylistLoop(true), "Playlist looping on"),
        Switch::Off => (CoreCommand::SetPlaylistLoop(false), "Playlist looping off"),
        Switch::Toggle => (CoreCommand::TogglePlaylistLoop, "Playlist looping toggled"),
    };
    util::run(controller, command, done, global).await
}
