//! Volume and brightness command handlers.

use xsched_core::{Command as CoreCommand, Controller};

use crate::cli::{GlobalOpts, VolumeArgs, VolumeCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    controller: &Controller,
    args: VolumeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        VolumeCommand::Set { volume } => {
            let volume = percent("volume", volume)?;
            util::run(
                controller,
                CoreCommand::SetVolume(volume),
                &format!("Volume set to {volume}%"),
                global,
            )
            .await
        }

        VolumeCommand::Adjust { delta } => {
            if !(-100..=100).contains(&delta) {
                return Err(CliError::Validation {
                    field: "delta".into(),
                    reason: format!("{delta} is outside -100..=100"),
                });
            }
            util::run(
                controller,
                CoreCommand::AdjustVolume(delta),
                &format!("Volume adjusted by {delta:+}"),
                global,
            )
            .await
        }

        VolumeCommand::Mute => util::run(controller, CoreCommand::Mute(true), "Muted", global).await,

        VolumeCommand::Unmute => {
            let restore = controller.derived().last_nonzero_volume;
            let done = match restore {
                Some(v) => format!("Unmuted ({v}%)"),
                None => "Unmuted".to_owned(),
            };
            util::run(controller, CoreCommand::Mute(false), &done, global).await
        }
    }
}

pub async fn brightness(
    controller: &Controller,
    value: i64,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let value = percent("brightness", value)?;
    util::run(
        controller,
        CoreCommand::SetBrightness(value),
        &format!("Brightness set to {value}%"),
        global,
    )
    .await
}

fn percent(field: &str, value: i64) -> Result<i64, CliError> {
    if (0..=100).contains(&value) {
        Ok(value)
    } else {
        Err(CliError::Validation {
            field: field.into(),
            reason: format!("{value} is outside 0..=100"),
        })
    }
}
