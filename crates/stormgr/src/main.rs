mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use stormgr_api::StorageClient;

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
        // Config commands don't need a cluster connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "stormgr", &mut std::io::stdout());
            Ok(())
        }

        // All other commands require a cluster session
        cmd => {
            let cfg = config::load_config_or_default();
            let session = config::resolve_session(&cli.global, &cfg)?;
            let client = StorageClient::connect(session)?
                .with_monitor_options(config::resolve_monitor_options(&cli.global, &cfg));
            let format = config::output_format(&cli.global, &cfg);

            tracing::debug!(command = ?cmd, cluster = client.session().cluster(), "dispatching command");
            let result = commands::dispatch(cmd, &client, &cli.global, format).await;

            if let Err(e) = client.logout().await {
                tracing::debug!(error = %e, "logout failed");
            }
            result
        }
    }
}
