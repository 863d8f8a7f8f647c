//! # hostevm
//!
//! Command-line front end for the compliance harness.
//!
//! ## Usage
//!
//! ```bash
//! # Bootstrap a session on the in-memory ledger and show its wiring
//! hostevm bootstrap
//! hostevm --config harness.toml bootstrap --owner 0x2a
//!
//! # Ledger address of an emulated account
//! hostevm address 0x00000000000000000000000000000000000abde1
//! hostevm address 0x...abde1 --deployer 0x5 --class-hash 0x7
//!
//! # Conformance vectors for a ruleset
//! EF_TESTS_ROOT=./vectors hostevm vectors --network Shanghai
//! ```

use clap::{Parser, Subcommand};
use hostevm_harness::HarnessConfig;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod error;
mod output;

pub use error::CliError;
pub use output::{Format, Report};

/// hostevm compliance harness CLI
#[derive(Parser, Debug)]
#[command(name = "hostevm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Harness configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Derive the ledger address of an emulated account
    Address(commands::address::AddressArgs),
    /// Bootstrap a session on an in-memory ledger
    Bootstrap(commands::session::SessionArgs),
    /// List conformance vectors selected for a ruleset
    Vectors(commands::vectors::VectorsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = run(cli.command, cli.config, cli.json).await;

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands, config_path: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let config = match config_path {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };

    match command {
        Commands::Address(args) => commands::address::execute(&config, args, json).await,
        Commands::Bootstrap(args) => commands::session::execute(&config, args, json).await,
        Commands::Vectors(args) => commands::vectors::execute(args, json),
    }
}
