//! Raw command/query passthrough and scheduler shutdown.

use serde_json::Value;
use xsched_core::{Command as CoreCommand, Controller};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn command(
    controller: &Controller,
    name: &str,
    parameters: &str,
    data: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reply = controller.run_command(name, parameters, data).await?;
    print_reply(&reply, global);
    Ok(())
}

pub async fn query(
    controller: &Controller,
    name: &str,
    parameters: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reply = controller.query(name, parameters).await?;
    print_reply(&reply, global);
    Ok(())
}

pub async fn close(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    if !util::confirm("Close xSchedule? The show stops until it is restarted.", global.yes)? {
        return Ok(());
    }
    util::run(controller, CoreCommand::CloseScheduler, "xSchedule closing", global).await
}

/// Replies have no fixed shape: tables fall back to pretty JSON.
fn print_reply(reply: &Value, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        reply,
        |v| output::render_json_pretty(v),
        |v| match v.get("result") {
            Some(Value::String(result)) => result.clone(),
            _ => output::render_json_compact(v),
        },
    );
    output::print_output(&out, global.quiet);
}
