//! Lumen CLI - account queries over ledger and indexed state

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{account, accounts, logs};

/// Lumen - query accounts from the ledger and index databases
#[derive(Parser)]
#[command(name = "lumen", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one account from the ledger state
    Account {
        /// Account address (G...)
        address: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List accounts by signer or by held asset
    Accounts(accounts::AccountsArgs),

    /// View and manage the request log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LUMEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Account { address, json } => account::run(&address, json).await,
        Commands::Accounts(args) => accounts::run(args).await,
        Commands::Logs { command } => logs::run(command),
    }
}
