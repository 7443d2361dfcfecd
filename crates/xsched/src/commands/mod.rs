//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod background;
pub mod config_cmd;
pub mod playback;
pub mod playlists;
pub mod raw;
pub mod status;
pub mod test_mode;
pub mod toggles;
pub mod util;
pub mod volume;
pub mod watch;

use xsched_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a scheduler-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(controller, global),
        Command::Playlists(args) => playlists::handle(controller, args, global).await,
        Command::Play {
            playlist,
            step,
            looped,
        } => playback::play(controller, playlist, step, looped, global).await,
        Command::Resume => playback::resume(controller, global).await,
        Command::Pause => playback::pause(controller, global).await,
        Command::Stop { all } => playback::stop(controller, all, global).await,
        Command::Next => playback::next(controller, global).await,
        Command::Prior => playback::prior(controller, global).await,
        Command::Restart => playback::restart(controller, global).await,
        Command::Seek { position_ms } => playback::seek(controller, position_ms, global).await,
        Command::Volume(args) => volume::handle(controller, args, global).await,
        Command::Brightness { percent } => volume::brightness(controller, percent, global).await,
        Command::Output { state } => toggles::output(controller, state, global).await,
        Command::Loop { state } => toggles::looping(controller, state, global).await,
        Command::TestMode(args) => test_mode::handle(controller, args, global).await,
        Command::Background(args) => background::handle(controller, args, global).await,
        Command::RawCommand {
            name,
            parameters,
            data,
        } => raw::command(controller, &name, &parameters, data.as_deref(), global).await,
        Command::Query { name, parameters } => {
            raw::query(controller, &name, &parameters, global).await
        }
        Command::Close => raw::close(controller, global).await,
        // Config, Completions and Watch are handled before dispatch
        Command::Config(_) | Command::Completions(_) | Command::Watch(_) => Ok(()),
    }
}
