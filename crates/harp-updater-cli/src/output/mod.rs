//! Output formatting for CLI results.

pub mod json;
pub mod table;

use std::path::Path;

pub use json::JsonOutput;
pub use table::TableOutput;

use harp_updater_core::deploy::DeployReport;
use harp_updater_core::firmware::FirmwareDescriptor;
use harp_updater_core::{AppConfig, Device};

/// Result of checking a firmware file against one device.
pub struct Compatibility {
    pub device_id: String,
    pub device_name: String,
    /// Why the pairing is rejected; `None` when compatible
    pub error: Option<String>,
}

/// Output formatter trait
pub trait OutputFormatter {
    /// Format device list
    fn format_devices(&self, devices: &[Device]) -> String;

    /// Format a firmware description, optionally with a device compatibility check
    fn format_firmware(
        &self,
        firmware: &FirmwareDescriptor,
        compatibility: Option<&Compatibility>,
    ) -> String;

    /// Format the per-device results of a deploy
    fn format_deploy_report(&self, report: &DeployReport) -> String;

    /// Format the effective configuration
    fn format_config(&self, config: &AppConfig, path: &Path) -> String;

    /// Format a generic message
    fn format_message(&self, message: &str) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
