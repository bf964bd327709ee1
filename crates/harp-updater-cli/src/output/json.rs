//! JSON-formatted output for CLI.

use std::path::Path;

use serde::Serialize;
use serde_json::json;

use super::{Compatibility, OutputFormatter};
use harp_updater_core::deploy::DeployReport;
use harp_updater_core::firmware::FirmwareDescriptor;
use harp_updater_core::{AppConfig, Device};

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_devices(&self, devices: &[Device]) -> String {
        let items: Vec<_> = devices
            .iter()
            .map(|d| {
                json!({
                    "id": d.id,
                    "name": d.display_name(),
                    "health": d.health().as_str(),
                    "device": d,
                })
            })
            .collect();

        Self::to_json(&json!({
            "devices": items,
            "count": devices.len()
        }))
    }

    fn format_firmware(
        &self,
        firmware: &FirmwareDescriptor,
        compatibility: Option<&Compatibility>,
    ) -> String {
        let mut output = json!({ "firmware": firmware });

        if let Some(check) = compatibility {
            output["compatibility"] = json!({
                "deviceId": check.device_id,
                "deviceName": check.device_name,
                "compatible": check.error.is_none(),
                "error": check.error,
            });
        }

        Self::to_json(&output)
    }

    fn format_deploy_report(&self, report: &DeployReport) -> String {
        Self::to_json(&json!({
            "report": report,
            "summary": {
                "total": report.total(),
                "succeeded": report.succeeded(),
                "failed": report.failed()
            }
        }))
    }

    fn format_config(&self, config: &AppConfig, path: &Path) -> String {
        Self::to_json(&json!({
            "path": path,
            "config": config
        }))
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use harp_updater_core::deploy::DeviceOutcome;

    fn report() -> DeployReport {
        let outcome = |id: &str, success: bool| DeviceOutcome {
            device_id: id.to_string(),
            display_name: "Behavior".to_string(),
            target: id.to_string(),
            success,
            output: None,
            error: (!success).then(|| "exited with exit code 2".to_string()),
            port_in_use: false,
        };
        DeployReport {
            firmware: PathBuf::from("Behavior.hex"),
            batch: true,
            forced: false,
            stages: Vec::new(),
            outcomes: vec![outcome("COM3", true), outcome("COM4", false)],
        }
    }

    #[test]
    fn test_deploy_report_summary() {
        let output: serde_json::Value =
            serde_json::from_str(&JsonOutput::new().format_deploy_report(&report())).unwrap();
        assert_eq!(output["summary"]["total"], 2);
        assert_eq!(output["summary"]["failed"], 1);
        assert_eq!(output["report"]["outcomes"][1]["deviceId"], "COM4");
    }

    #[test]
    fn test_devices_include_health() {
        let mut device: Device = serde_json::from_str(
            r#"{"Kind":"ATxmega","State":"Bootloader","PortName":"COM3"}"#,
        )
        .unwrap();
        device.id = "COM3".to_string();

        let output: serde_json::Value =
            serde_json::from_str(&JsonOutput::new().format_devices(&[device])).unwrap();
        assert_eq!(output["count"], 1);
        assert_eq!(output["devices"][0]["health"], "Bootloader");
        assert_eq!(output["devices"][0]["device"]["PortName"], "COM3");
    }
}
