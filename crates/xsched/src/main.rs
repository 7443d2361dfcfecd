mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use xsched_core::Controller;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a scheduler connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "xsched", &mut std::io::stdout());
            Ok(())
        }

        // Watch keeps polling until interrupted
        Command::Watch(args) => {
            let mut controller_config = config::build_controller_config(&cli.global)?;
            controller_config.polling_enabled = true;
            let controller = Controller::new(controller_config)?;
            // Subscribed before connecting so the first cycle's events show.
            let events = controller.events();
            controller.connect().await?;

            let result = commands::watch::handle(&controller, events, &args, &cli.global).await;
            controller.disconnect().await;
            result
        }

        // Everything else runs against a single refreshed snapshot
        cmd => {
            let mut controller_config = config::build_controller_config(&cli.global)?;
            controller_config.polling_enabled = false;
            let controller = Controller::new(controller_config)?;
            controller.connect().await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &controller, &cli.global).await;
            controller.disconnect().await;
            result
        }
    }
}
