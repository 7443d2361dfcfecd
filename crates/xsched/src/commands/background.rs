//! Background playlist handlers.

use xsched_core::{Command as CoreCommand, Controller};

use crate::cli::{BackgroundArgs, BackgroundCommand, GlobalOpts};
use crate::error::CliError;

use super::util;

pub async fn handle(
    controller: &Controller,
    args: BackgroundArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BackgroundCommand::Set { playlist } => {
            let done = format!("Background playlist set to '{playlist}'");
            util::run(controller, CoreCommand::SetBackgroundPlaylist(playlist), &done, global).await
        }
        BackgroundCommand::Clear => {
            util::run(
                controller,
                CoreCommand::ClearBackgroundPlaylist,
                "Background playlist cleared",
                global,
            )
            .await
        }
    }
}
