//! CLI command definitions for the `wagenie` binary.

pub mod creds;
pub mod run;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// A personal messaging bot that answers commands with generated text and
/// images.
#[derive(Parser)]
#[command(name = "wagenie", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the bot: connect, pair if needed, dispatch commands.
    Run {
        /// Serve the pairing/health HTTP surface on this address
        /// (e.g. 127.0.0.1:3000).
        #[arg(long, value_name = "ADDR")]
        pairing_http: Option<std::net::SocketAddr>,

        /// Bridge tracing spans to an OpenTelemetry stdout exporter.
        #[arg(long)]
        otel: bool,
    },

    /// Inspect or reset the persisted session credentials.
    Creds {
        #[command(subcommand)]
        action: CredsCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum CredsCommand {
    /// Show registration state and record location.
    Show,

    /// Delete the credential record; the next run re-pairs.
    Reset,
}
