//! Binary entry point for catalog-transfer.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use catalog_transfer::observability::{self, InitOptions};
use catalog_transfer::{CatalogClient, CatalogSession, HttpCatalogClient, TransferConfig};

use commands::{cmd_export, cmd_import};

/// Exports a data catalog to a JSON document and imports it into another.
#[derive(Parser)]
#[command(name = "catalog-transfer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Export catalog assets to a JSON document.
    Export {
        /// Output document path.
        path: PathBuf,

        /// Search terms selecting the assets (default: all assets).
        search_term: Option<String>,
    },

    /// Import assets from a JSON document.
    Import {
        /// Input document path.
        path: PathBuf,

        /// Validate the document without creating assets.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match TransferConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(
        &config.logging,
        InitOptions {
            verbose: cli.verbose,
        },
    ) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: &TransferConfig) -> catalog_transfer::Result<()> {
    let session = CatalogSession::from_config(config)?;
    let client: Arc<dyn CatalogClient> = Arc::new(HttpCatalogClient::new(session, config));

    match command {
        Commands::Export { path, search_term } => cmd_export(config, client, &path, search_term),
        Commands::Import { path, dry_run } => cmd_import(client, &path, dry_run),
    }
}
