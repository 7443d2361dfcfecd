//! Test-mode command handlers.

use xsched_core::{Command as CoreCommand, Controller, TestModeRequest};

use crate::cli::{GlobalOpts, TestModeArgs, TestModeCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    controller: &Controller,
    args: TestModeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TestModeCommand::Start {
            mode,
            model,
            interval,
            foreground,
            background,
        } => {
            let request = TestModeRequest {
                mode,
                model,
                interval,
                foreground,
                background,
            };
            let done = format!("Test mode '{}' started", request.mode());
            util::run(controller, CoreCommand::StartTestMode(request), &done, global).await
        }

        TestModeCommand::Stop => {
            util::run(controller, CoreCommand::StopTestMode, "Test mode stopped", global).await
        }
    }
}
