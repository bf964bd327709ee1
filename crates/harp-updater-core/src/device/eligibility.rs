//! Deploy eligibility rules over a device snapshot.

use crate::error::DeviceError;
use crate::types::{Device, DeviceState};

/// Decide whether firmware may be deployed to `selected` given the whole snapshot.
///
/// A device in an error state blocks everything. A single device sitting in
/// its bootloader may only be flashed on its own, and two or more bootloader
/// devices are ambiguous and block everything.
pub fn check_deploy_eligibility(
    devices: &[Device],
    selected: &Device,
    batch: bool,
) -> Result<(), DeviceError> {
    if devices.is_empty() {
        return Err(DeviceError::DeployBlocked(
            "No devices available for firmware deployment".to_string(),
        ));
    }

    let in_error = devices
        .iter()
        .any(|d| matches!(d.state, DeviceState::DriverError | DeviceState::DeviceError));
    if in_error {
        return Err(DeviceError::DeployBlocked(
            "one or more devices are in an error state".to_string(),
        ));
    }

    let bootloader: Vec<&Device> = devices
        .iter()
        .filter(|d| d.state == DeviceState::Bootloader)
        .collect();

    match bootloader.as_slice() {
        [] => Ok(()),
        [only] => {
            if only.id != selected.id {
                return Err(DeviceError::DeployBlocked(
                    "deployment is allowed only to the single Bootloader device".to_string(),
                ));
            }
            if batch {
                return Err(DeviceError::DeployBlocked(
                    "batch update is not allowed when a device is in Bootloader state".to_string(),
                ));
            }
            Ok(())
        }
        _ => Err(DeviceError::DeployBlocked(
            "multiple devices are in Bootloader state".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, state: &str) -> Device {
        let mut d: Device = serde_json::from_value(serde_json::json!({
            "Kind": "Pico",
            "State": state,
            "PortName": id,
        }))
        .unwrap();
        d.id = id.to_string();
        d
    }

    #[test]
    fn test_all_online_is_eligible() {
        let devices = vec![device("COM3", "Online"), device("COM4", "Online")];
        assert!(check_deploy_eligibility(&devices, &devices[0], true).is_ok());
    }

    #[test]
    fn test_empty_snapshot_blocks() {
        let selected = device("COM3", "Online");
        assert!(check_deploy_eligibility(&[], &selected, false).is_err());
    }

    #[test]
    fn test_error_state_blocks() {
        let devices = vec![device("COM3", "Online"), device("COM4", "DeviceError")];
        let err = check_deploy_eligibility(&devices, &devices[0], false).unwrap_err();
        assert!(err.to_string().contains("error state"));
    }

    #[test]
    fn test_single_bootloader_rules() {
        let devices = vec![device("COM3", "Online"), device("BOOT", "Bootloader")];

        assert!(check_deploy_eligibility(&devices, &devices[1], false).is_ok());
        assert!(check_deploy_eligibility(&devices, &devices[0], false).is_err());
        assert!(check_deploy_eligibility(&devices, &devices[1], true).is_err());
    }

    #[test]
    fn test_multiple_bootloaders_block() {
        let devices = vec![device("A", "Bootloader"), device("B", "Bootloader")];
        assert!(check_deploy_eligibility(&devices, &devices[0], false).is_err());
    }
}
