//! Shared helpers for command handlers.

use std::io::IsTerminal;

use xsched_core::{Command as CoreCommand, CommandResult, Controller};

use crate::cli::GlobalOpts;
use crate::error::{CliError, prompt_err};

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Execute a core command and report the outcome on stderr.
pub async fn run(
    controller: &Controller,
    command: CoreCommand,
    done: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = controller.execute(command).await?;
    if !global.quiet {
        match result {
            CommandResult::Ok => eprintln!("✓ {done}"),
            CommandResult::Unchanged => eprintln!("Nothing to do: already in that state"),
        }
    }
    Ok(())
}
