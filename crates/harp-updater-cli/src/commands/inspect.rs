//! Firmware inspection.

use crate::cli::InspectArgs;
use crate::console::spinner;
use crate::error::{CliError, DeviceError};
use crate::output::{get_formatter, Compatibility};

use harp_updater_core::AppConfig;

use super::{open_context, Options};

/// Run the inspect command
pub async fn run_inspect(
    args: InspectArgs,
    config: &AppConfig,
    opts: &Options,
) -> Result<(), CliError> {
    let mut ctx = open_context(config, opts)?;
    let formatter = get_formatter(opts.json);

    let pb = spinner(format!("Inspecting {}...", args.firmware.display()), opts.json);
    let inspected = ctx.firmware_mut().inspect(&args.firmware).await;
    pb.finish_and_clear();
    let descriptor = inspected?;

    let compatibility = match args.device {
        Some(id) => {
            ctx.refresh().await?;
            let device = ctx
                .devices()
                .get(&id)
                .ok_or_else(|| DeviceError::NotFound(id.clone()))?;
            Some(Compatibility {
                device_id: device.id.clone(),
                device_name: device.display_name(),
                error: ctx
                    .firmware()
                    .validate(device, &descriptor)
                    .err()
                    .map(|e| e.to_string()),
            })
        }
        None => None,
    };

    println!(
        "{}",
        formatter.format_firmware(&descriptor, compatibility.as_ref())
    );
    Ok(())
}
