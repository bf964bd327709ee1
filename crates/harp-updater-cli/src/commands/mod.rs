//! Command implementations.

pub mod config;
pub mod deploy;
pub mod drivers;
pub mod inspect;
pub mod list;

pub use config::run_config;
pub use deploy::run_deploy;
pub use drivers::run_install_drivers;
pub use inspect::run_inspect;
pub use list::run_list;

use std::path::PathBuf;

use tracing::debug;

use crate::console::ConsoleSink;
use crate::error::CliError;

use harp_updater_core::{AppConfig, DeployContext, ProcessRunner, RegulatorClient};

/// Global flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub json: bool,
    pub verbose: bool,
    pub strict: bool,
    /// `--regulator` / `HARP_REGULATOR`
    pub regulator: Option<PathBuf>,
}

fn regulator_client(
    config: &AppConfig,
    opts: &Options,
) -> Result<RegulatorClient<ProcessRunner>, CliError> {
    let program = config.resolve_regulator(opts.regulator.as_deref())?;
    debug!(regulator = %program.display(), "using regulator executable");
    Ok(RegulatorClient::new(ProcessRunner::new(program)))
}

fn open_context(
    config: &AppConfig,
    opts: &Options,
) -> Result<DeployContext<ProcessRunner>, CliError> {
    let client = regulator_client(config, opts)?;
    Ok(DeployContext::new(client, config)
        .with_sink(Box::new(ConsoleSink::new(opts.json, opts.verbose))))
}
