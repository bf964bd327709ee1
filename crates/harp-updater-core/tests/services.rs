mod common;

use std::sync::Arc;

use common::{firmware_file, FakeRunner, ONE_PICO, THREE_BEHAVIOR_BOARDS};
use harp_updater_core::device::{resolve_upload_target, DeviceFilter, DeviceManager};
use harp_updater_core::error::{CoreError, FirmwareError, RegulatorError};
use harp_updater_core::firmware::FirmwareService;
use harp_updater_core::regulator::CommandOutput;
use harp_updater_core::{DeviceKind, HealthStatus, RegulatorClient};

fn manager(runner: FakeRunner) -> DeviceManager<FakeRunner> {
    DeviceManager::new(Arc::new(RegulatorClient::new(runner)))
}

fn service(runner: FakeRunner) -> FirmwareService<FakeRunner> {
    FirmwareService::new(Arc::new(RegulatorClient::new(runner)))
}

#[tokio::test]
async fn test_refresh_with_no_devices() {
    for stdout in ["[]", "", "  \n"] {
        let mut mgr = manager(FakeRunner::with_devices(stdout));
        assert!(mgr.refresh(false).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_refresh_passes_list_flags() {
    let runner = FakeRunner::with_devices("[]");
    let mut mgr = manager(runner.clone()).with_list_all(false);
    mgr.refresh(true).await.unwrap();
    assert_eq!(runner.calls()[0], vec!["list", "--json", "--allow-connect"]);
}

#[tokio::test]
async fn test_refresh_surfaces_command_failure() {
    let runner = FakeRunner::new(|_| CommandOutput::failure(1, "libusb not found"));
    let mut mgr = manager(runner);
    let err = mgr.refresh(false).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Regulator(RegulatorError::CommandFailed { .. })
    ));
}

#[tokio::test]
async fn test_upload_targets_per_family() {
    let runner = FakeRunner::with_devices(
        r#"[
            {"Kind":"Pico","State":"Online","PortName":"COM7","DeviceDescription":"Sensor"},
            {"Kind":"ATxmega","State":"Online","PortName":"COM3","DeviceDescription":"Behavior"},
            {"Kind":"ATxmega","State":"Bootloader","SerialNumber":4411}
        ]"#,
    );
    let mut mgr = manager(runner);
    let devices = mgr.refresh(false).await.unwrap().to_vec();

    let targets: Vec<String> = devices.iter().map(resolve_upload_target).collect();
    assert_eq!(targets, vec!["PICOBOOT", "COM3", "4411"]);
}

#[tokio::test]
async fn test_filter_by_health() {
    let runner = FakeRunner::with_devices(
        r#"[
            {"Kind":"ATxmega","State":"Online","PortName":"COM3"},
            {"Kind":"ATxmega","State":"DriverError","Source":"USB\\VID_0403"}
        ]"#,
    );
    let mut mgr = manager(runner);
    mgr.refresh(false).await.unwrap();

    let broken = mgr.filter_by(&DeviceFilter {
        health: Some(HealthStatus::Error),
        ..Default::default()
    });
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].kind, DeviceKind::ATxmega);
}

#[tokio::test]
async fn test_inspect_is_cached_per_path() {
    let runner = FakeRunner::with_devices(ONE_PICO);
    let dir = tempfile::tempdir().unwrap();
    let uf2 = firmware_file(dir.path(), "EnvironmentSensor.uf2");

    let mut firmware = service(runner.clone());
    let first = firmware.inspect(&uf2).await.unwrap();
    let second = firmware.inspect(&uf2).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.who_am_i(), Some(1216));
    assert_eq!(runner.calls_to("inspect").len(), 1);
    assert_eq!(firmware.cached(), 1);

    // Local description keeps the inspected metadata without another call.
    let described = firmware.describe(&uf2).await.unwrap();
    assert_eq!(described.version().as_deref(), Some("1.2.0"));
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_failed_inspect_is_not_cached() {
    let runner = FakeRunner::new(|_| CommandOutput::success(""));
    let dir = tempfile::tempdir().unwrap();
    let hex = firmware_file(dir.path(), "Behavior.hex");

    let mut firmware = service(runner.clone());
    assert!(firmware.inspect(&hex).await.is_err());
    assert!(firmware.inspect(&hex).await.is_err());
    assert_eq!(runner.calls_to("inspect").len(), 2);
    assert_eq!(firmware.cached(), 0);
}

#[tokio::test]
async fn test_inspect_missing_file_skips_regulator() {
    let runner = FakeRunner::with_devices(THREE_BEHAVIOR_BOARDS);
    let dir = tempfile::tempdir().unwrap();

    let mut firmware = service(runner.clone());
    let err = firmware
        .inspect(&dir.path().join("gone.uf2"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Firmware(FirmwareError::FileNotFound(_))));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_validate_against_devices() {
    let runner = FakeRunner::with_devices(THREE_BEHAVIOR_BOARDS);
    let dir = tempfile::tempdir().unwrap();
    let hex = firmware_file(dir.path(), "Behavior.hex");
    let uf2 = firmware_file(dir.path(), "Behavior.uf2");

    let mut mgr = manager(runner.clone());
    let device = mgr.refresh(false).await.unwrap()[0].clone();
    let firmware = service(runner);

    let hex = firmware.describe(&hex).await.unwrap();
    let uf2 = firmware.describe(&uf2).await.unwrap();
    assert!(firmware.validate(&device, &hex).is_ok());
    assert!(matches!(
        firmware.validate(&device, &uf2),
        Err(FirmwareError::IncompatibleKind { .. })
    ));
}

#[tokio::test]
async fn test_catalog_is_unavailable() {
    let firmware = service(FakeRunner::with_devices("[]"));
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        firmware.available_versions("Behavior").await,
        Err(FirmwareError::CatalogUnavailable)
    ));
    assert!(matches!(
        firmware.download("1.2.0", "Behavior", dir.path()).await,
        Err(FirmwareError::CatalogUnavailable)
    ));
}
