//! Upload target naming.

use crate::types::{Device, DeviceKind};

/// Families whose uploads go through a fixed bootloader name instead of the
/// device's own identifier.
pub const BOOTLOADER_TARGETS: &[(DeviceKind, &str)] = &[(DeviceKind::Pico, "PICOBOOT")];

/// Name passed to `upload --target` for this device.
///
/// Other families use their natural identifier (port, then serial number),
/// never the snapshot-disambiguated id.
pub fn resolve_upload_target(device: &Device) -> String {
    BOOTLOADER_TARGETS
        .iter()
        .find(|(kind, _)| *kind == device.kind)
        .map(|(_, target)| target.to_string())
        .unwrap_or_else(|| device.natural_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(kind: &str, port: &str) -> Device {
        let mut d: Device = serde_json::from_value(serde_json::json!({
            "Kind": kind,
            "State": "Online",
            "PortName": port,
        }))
        .unwrap();
        d.id = port.to_string();
        d
    }

    #[test]
    fn test_pico_maps_to_bootloader() {
        assert_eq!(resolve_upload_target(&device("Pico", "COM5")), "PICOBOOT");
        assert_eq!(resolve_upload_target(&device("Pico", "COM6")), "PICOBOOT");
    }

    #[test]
    fn test_other_families_pass_through() {
        assert_eq!(resolve_upload_target(&device("ATxmega", "COM3")), "COM3");
        assert_eq!(resolve_upload_target(&device("Mystery", "COM9")), "COM9");
    }
}
