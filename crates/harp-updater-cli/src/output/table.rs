//! Table-formatted output for CLI.

use std::path::Path;

use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use super::{Compatibility, OutputFormatter};
use harp_updater_core::deploy::DeployReport;
use harp_updater_core::firmware::FirmwareDescriptor;
use harp_updater_core::{AppConfig, Device, HealthStatus};

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn health_cell(health: HealthStatus) -> Cell {
        let cell = Cell::new(health.as_str());
        match health {
            HealthStatus::Healthy => cell.fg(Color::Green),
            HealthStatus::Bootloader => cell.fg(Color::Yellow),
            HealthStatus::Error => cell.fg(Color::Red),
            HealthStatus::Unknown => cell,
        }
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

impl OutputFormatter for TableOutput {
    fn format_devices(&self, devices: &[Device]) -> String {
        if devices.is_empty() {
            return "No devices found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            "ID", "Name", "Kind", "Status", "Port", "Serial", "Firmware", "Hardware", "WhoAmI",
        ]);

        for device in devices {
            table.add_row(vec![
                Cell::new(&device.id),
                Cell::new(device.display_name()),
                Cell::new(device.kind.as_str()),
                Self::health_cell(device.health()),
                Cell::new(or_dash(device.port_name.as_deref())),
                Cell::new(or_dash(device.serial_number.as_deref())),
                Cell::new(or_dash(device.firmware_version.as_deref())),
                Cell::new(or_dash(device.hardware_version.as_deref())),
                Cell::new(
                    device
                        .who_am_i
                        .map(|w| w.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }

        format!("{}\n\nFound {} device(s)", table, devices.len())
    }

    fn format_firmware(
        &self,
        firmware: &FirmwareDescriptor,
        compatibility: Option<&Compatibility>,
    ) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Firmware: {}", firmware.file_name()));
        lines.push(format!("  Path:     {}", firmware.path.display()));
        lines.push(format!("  Size:     {} bytes", firmware.size));
        match firmware.target_kind {
            Some(kind) => lines.push(format!("  Target:   {} (.{})", kind, firmware.extension)),
            None => lines.push(format!("  Target:   {}", "unsupported file type".red())),
        }
        if let Some(version) = firmware.version() {
            lines.push(format!("  Version:  {}", version));
        }
        if let Some(who_am_i) = firmware.who_am_i() {
            lines.push(format!("  WhoAmI:   {}", who_am_i));
        }

        if let Some(metadata) = &firmware.metadata {
            let extra: Vec<_> = metadata
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "WhoAmI" | "Version" | "FirmwareVersion"))
                .collect();
            if !extra.is_empty() {
                lines.push("  Details:".to_string());
                for (key, value) in extra {
                    let value = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    lines.push(format!("    {}: {}", key, value));
                }
            }
        }

        if let Some(check) = compatibility {
            let status = match &check.error {
                None => "[OK] compatible".green(),
                Some(reason) => format!("[X] {}", reason).red(),
            };
            lines.push(format!(
                "  Device:   {} ({}) {}",
                check.device_name, check.device_id, status
            ));
        }

        lines.join("\n")
    }

    fn format_deploy_report(&self, report: &DeployReport) -> String {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Device", "Name", "Target", "Status", "Result"]);

        for outcome in &report.outcomes {
            let status_cell = if outcome.success {
                Cell::new("OK").fg(Color::Green)
            } else if outcome.port_in_use {
                Cell::new("PORT BUSY").fg(Color::Red)
            } else {
                Cell::new("FAIL").fg(Color::Red)
            };
            let result = outcome
                .error
                .as_deref()
                .or(outcome.output.as_deref())
                .map(|s| s.trim().lines().last().unwrap_or_default())
                .unwrap_or_default();

            table.add_row(vec![
                Cell::new(&outcome.device_id),
                Cell::new(&outcome.display_name),
                Cell::new(&outcome.target),
                status_cell,
                Cell::new(result),
            ]);
        }

        let summary = format!(
            "\nSummary: {} succeeded, {} failed",
            report.succeeded().to_string().green(),
            report.failed().to_string().red()
        );

        format!("{}{}", table, summary)
    }

    fn format_config(&self, config: &AppConfig, path: &Path) -> String {
        let regulator = config
            .regulator_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(auto)".to_string());
        let auto_force: Vec<&str> = config.force.auto_force_kinds.iter().map(|k| k.as_str()).collect();

        let lines = [
            format!("Config file: {}", path.display()),
            format!("  Regulator:           {}", regulator),
            format!("  UI port:             {}", config.ui_port),
            format!("  Native window:       {}", config.native_window),
            format!("  Connect on refresh:  {}", config.connect_on_refresh),
            format!("  List all devices:    {}", config.list_all),
            format!("  Log capacity:        {}", config.log_capacity),
            "  Force:".to_string(),
            format!("    Bypass compatibility: {}", config.force.bypass_compatibility),
            format!("    Bypass eligibility:   {}", config.force.bypass_eligibility),
            format!("    Always force:         {}", auto_force.join(", ")),
            "  Timings:".to_string(),
            format!("    Release delay:        {} ms", config.timings.release_delay_ms),
            format!("    Between devices:      {} ms", config.timings.between_devices_ms),
            format!("    Reboot delay:         {} ms", config.timings.reboot_delay_ms),
        ];

        lines.join("\n")
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}
