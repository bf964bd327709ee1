//! USB driver installation.

use crate::console::spinner;
use crate::error::CliError;
use crate::output::get_formatter;

use harp_updater_core::AppConfig;

use super::{regulator_client, Options};

/// Run the install-drivers command
pub async fn run_install_drivers(config: &AppConfig, opts: &Options) -> Result<(), CliError> {
    let client = regulator_client(config, opts)?;
    let formatter = get_formatter(opts.json);

    let pb = spinner("Installing drivers...", opts.json);
    let result = client.install_drivers().await;
    pb.finish_and_clear();
    let output = result?;

    let message = match output.trim() {
        "" => "Drivers installed.",
        text => text,
    };
    println!("{}", formatter.format_message(message));
    Ok(())
}
