//! Type definitions shared by the device manager, firmware service and front ends.
//!
//! `Device` mirrors one element of the `HarpRegulator list --json` array. Keys
//! arrive in PascalCase; anything the regulator reports that is not modelled
//! here is kept in `extra` so it survives a round trip to JSON output.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A Harp device as reported by one `list` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Device {
    /// Snapshot-unique identifier, assigned when the snapshot is built.
    #[serde(skip_deserializing)]
    pub id: String,
    /// Detection confidence
    #[serde(default)]
    pub confidence: Confidence,
    /// Device family
    #[serde(default)]
    pub kind: DeviceKind,
    /// Connection state
    #[serde(default)]
    pub state: DeviceState,
    /// COM port or device path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_name: Option<String>,
    /// WhoAmI register value
    #[serde(default, rename = "WhoAmI", skip_serializing_if = "Option::is_none")]
    pub who_am_i: Option<u32>,
    /// Human-readable device name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_description: Option<String>,
    /// Serial number; the regulator sometimes reports it as a number
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_version: Option<String>,
    /// Enumeration source (USB path, driver description)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Fields reported by the regulator that are not modelled above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Device {
    /// Identifier derived from the record itself, before snapshot disambiguation.
    pub fn natural_id(&self) -> String {
        self.port_name
            .as_ref()
            .or(self.serial_number.as_ref())
            .or(self.source.as_ref())
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Name shown to operators; batch deploys group devices by it.
    pub fn display_name(&self) -> String {
        if let Some(desc) = self.device_description.as_deref().filter(|d| !d.is_empty()) {
            return desc.to_string();
        }
        if let Some(who_am_i) = self.who_am_i.filter(|w| *w != 0) {
            return format!("Device {}", who_am_i);
        }
        if let Some(port) = &self.port_name {
            return format!("Device on {}", port);
        }
        "Unknown Device".to_string()
    }

    pub fn health(&self) -> HealthStatus {
        match self.state {
            DeviceState::Online => HealthStatus::Healthy,
            DeviceState::Bootloader => HealthStatus::Bootloader,
            DeviceState::DriverError | DeviceState::DeviceError => HealthStatus::Error,
            DeviceState::Unknown => HealthStatus::Unknown,
        }
    }

    /// Short "port • HW vX • kind" summary line.
    pub fn metadata_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(port) = &self.port_name {
            parts.push(port.clone());
        }
        if let Some(hw) = &self.hardware_version {
            parts.push(format!("HW v{}", hw));
        }
        if self.kind != DeviceKind::Unknown {
            parts.push(self.kind.to_string());
        }
        parts.join(" • ")
    }

    /// A port is mandatory unless the device sits in its bootloader or has no driver.
    pub fn validate(&self) -> Result<(), String> {
        let port_optional = matches!(self.state, DeviceState::Bootloader | DeviceState::DriverError);
        if !port_optional && self.port_name.is_none() {
            return Err(format!(
                "PortName is required when device state is '{}'",
                self.state
            ));
        }
        Ok(())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Device family; governs firmware format and upload target naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(alias = "PICO")]
    Pico,
    ATxmega,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Pico => "Pico",
            DeviceKind::ATxmega => "ATxmega",
            DeviceKind::Unknown => "Unknown",
        }
    }

    /// Parse a family name case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pico" => Some(DeviceKind::Pico),
            "atxmega" => Some(DeviceKind::ATxmega),
            "unknown" => Some(DeviceKind::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceState {
    Online,
    Bootloader,
    DriverError,
    DeviceError,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceState::Online => "Online",
            DeviceState::Bootloader => "Bootloader",
            DeviceState::DriverError => "DriverError",
            DeviceState::DeviceError => "DeviceError",
            DeviceState::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Health classification derived from device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Bootloader,
    Error,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Bootloader => "Bootloader",
            HealthStatus::Error => "Error",
            HealthStatus::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "healthy" => Some(HealthStatus::Healthy),
            "bootloader" => Some(HealthStatus::Bootloader),
            "error" => Some(HealthStatus::Error),
            "unknown" => Some(HealthStatus::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Firmware image formats the regulator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirmwareType {
    /// UF2 image for Pico (RP2040) devices
    Uf2,
    /// Intel HEX image for ATxmega devices
    Hex,
}

impl FirmwareType {
    /// Match a file extension (without the dot), ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "uf2" => Some(FirmwareType::Uf2),
            "hex" => Some(FirmwareType::Hex),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FirmwareType::Uf2 => ".uf2",
            FirmwareType::Hex => ".hex",
        }
    }

    /// Family this image format is built for.
    pub fn target_kind(&self) -> DeviceKind {
        match self {
            FirmwareType::Uf2 => DeviceKind::Pico,
            FirmwareType::Hex => DeviceKind::ATxmega,
        }
    }

    /// Format required by a device family, if the family is supported at all.
    pub fn required_by(kind: DeviceKind) -> Option<Self> {
        match kind {
            DeviceKind::Pico => Some(FirmwareType::Uf2),
            DeviceKind::ATxmega => Some(FirmwareType::Hex),
            DeviceKind::Unknown => None,
        }
    }
}
