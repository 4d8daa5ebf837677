//! Wagenie CLI entry point.
//!
//! Binary name: `wagenie`
//!
//! Parses CLI arguments, initializes tracing and application state, then
//! dispatches to the command handlers.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, CredsCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions need neither tracing nor app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "wagenie", &mut std::io::stdout());
        return Ok(());
    }

    let directives = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info,wagenie=info",
        1 => "info,wagenie=debug",
        _ => "trace",
    };
    let otel = matches!(&cli.command, Commands::Run { otel: true, .. });
    wagenie_observe::tracing_setup::init_tracing(otel, Some(directives))
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Run { pairing_http, .. } => {
            cli::run::run_bot(&state, pairing_http, cli.json).await
        }
        Commands::Creds { action } => match action {
            CredsCommand::Show => cli::creds::show_creds(&state, cli.json).await,
            CredsCommand::Reset => cli::creds::reset_creds(&state, cli.json).await,
        },
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    wagenie_observe::tracing_setup::shutdown_tracing();
    result
}
