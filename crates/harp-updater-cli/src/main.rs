//! Harp Updater CLI - discover Harp devices and deploy firmware from the terminal.
//!
//! Every device operation is delegated to the HarpRegulator executable through
//! the shared core library.

mod cli;
mod commands;
mod console;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::Options;
use error::{exit_codes, CliError};

use harp_updater_core::AppConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Activity entries are already printed by the console sink, so their
/// `tracing` mirror is off unless RUST_LOG asks for it.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info,activity=off" } else { "warn,activity=off" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::default_path()?,
    };
    // Config commands must work even when the file on disk is broken.
    let loaded = AppConfig::load(&config_path).await;

    let opts = Options {
        json: cli.json,
        verbose: cli.verbose,
        strict: cli.strict,
        regulator: cli.regulator,
    };

    match cli.command {
        Commands::List(args) => commands::run_list(args, &loaded?, &opts).await,
        Commands::Inspect(args) => commands::run_inspect(args, &loaded?, &opts).await,
        Commands::Deploy(args) => commands::run_deploy(args, &loaded?, &opts).await,
        Commands::InstallDrivers => commands::run_install_drivers(&loaded?, &opts).await,
        Commands::Config(args) => commands::run_config(args, &config_path, opts.json).await,
    }
}
