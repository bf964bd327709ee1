//! Typed client over the regulator subcommands.

use std::path::Path;

use tracing::{debug, warn};

use super::commands::{Commands, ListOptions, UploadOptions};
use super::response::{is_port_in_use, parse_device_list, parse_inspect_output};
use super::runner::{CommandOutput, CommandRunner};
use crate::error::RegulatorError;
use crate::types::Device;

/// Client for the `HarpRegulator` executable.
///
/// Every call spawns exactly one process through the runner and surfaces
/// failures verbatim. Nothing is retried.
#[derive(Debug, Clone)]
pub struct RegulatorClient<R> {
    runner: R,
}

impl<R: CommandRunner> RegulatorClient<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// List connected devices.
    pub async fn list_devices(&self, options: ListOptions) -> Result<Vec<Device>, RegulatorError> {
        let output = self.execute(Commands::list(options), None).await?;
        let devices = parse_device_list(&output.stdout)?;
        debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Inspect a firmware image and return the regulator's metadata object.
    pub async fn inspect_firmware(
        &self,
        firmware: &Path,
    ) -> Result<serde_json::Map<String, serde_json::Value>, RegulatorError> {
        let output = self.execute(Commands::inspect(firmware), None).await?;
        parse_inspect_output(&output.stdout)
    }

    /// Upload a firmware image to `target` (port, serial number or bootloader name).
    ///
    /// Returns the regulator's stdout on success.
    pub async fn upload_firmware(
        &self,
        firmware: &Path,
        target: &str,
        options: UploadOptions,
    ) -> Result<String, RegulatorError> {
        let output = self
            .execute(Commands::upload(firmware, target, options), Some(target))
            .await?;
        Ok(output.stdout)
    }

    /// Install the USB drivers the regulator needs (Windows only on the tool side).
    pub async fn install_drivers(&self) -> Result<String, RegulatorError> {
        let output = self.execute(Commands::install_drivers(), None).await?;
        Ok(output.stdout)
    }

    async fn execute(
        &self,
        args: Vec<String>,
        target: Option<&str>,
    ) -> Result<CommandOutput, RegulatorError> {
        let command = args.first().cloned().unwrap_or_default();
        let output = self.runner.run(&args).await?;

        if output.is_success() {
            return Ok(output);
        }

        warn!(
            %command,
            code = ?output.code,
            stderr = %output.stderr.trim(),
            stdout = %output.stdout.trim(),
            "regulator command failed"
        );

        if let Some(target) = target {
            if is_port_in_use(&output.stderr) {
                return Err(RegulatorError::PortInUse {
                    target: target.to_string(),
                    stderr: output.stderr,
                });
            }
        }

        // Some failures are only reported on stdout
        let stderr = if output.stderr.trim().is_empty() {
            output.stdout
        } else {
            output.stderr
        };

        Err(RegulatorError::CommandFailed {
            command,
            code: output.code,
            stderr,
        })
    }
}
