//! Device listing.

use crate::cli::ListArgs;
use crate::console::spinner;
use crate::error::CliError;
use crate::output::get_formatter;

use harp_updater_core::device::DeviceFilter;
use harp_updater_core::AppConfig;

use super::{open_context, Options};

/// Run the list command
pub async fn run_list(args: ListArgs, config: &AppConfig, opts: &Options) -> Result<(), CliError> {
    let mut config = config.clone();
    if args.harp_only {
        config.list_all = false;
    }
    if args.connect {
        config.connect_on_refresh = true;
    } else if args.no_connect {
        config.connect_on_refresh = false;
    }

    let mut ctx = open_context(&config, opts)?;
    let formatter = get_formatter(opts.json);

    let pb = spinner("Scanning for devices...", opts.json);
    let refreshed = ctx.refresh().await.map(|devices| devices.len());
    pb.finish_and_clear();
    refreshed?;

    let filter = DeviceFilter {
        kind: args.kind.map(Into::into),
        health: args.status.map(Into::into),
        search: args.search,
    };
    let devices = ctx.devices().filter_by(&filter);

    println!("{}", formatter.format_devices(&devices));
    Ok(())
}
