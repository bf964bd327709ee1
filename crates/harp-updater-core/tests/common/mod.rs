//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use harp_updater_core::config::{AppConfig, DeployTimings};
use harp_updater_core::error::RegulatorError;
use harp_updater_core::regulator::{CommandOutput, CommandRunner};
use harp_updater_core::{DeployContext, RegulatorClient};

type Handler = dyn Fn(&[String]) -> CommandOutput + Send + Sync;

/// Runner that answers from a closure and records every argument vector.
///
/// Clones share the call log, so a test can keep one clone and hand the
/// other to the client.
#[derive(Clone)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    handler: Arc<Handler>,
}

impl FakeRunner {
    pub fn new(handler: impl Fn(&[String]) -> CommandOutput + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::default(),
            handler: Arc::new(handler),
        }
    }

    /// Answers `list` with `devices_json`, succeeds on everything else.
    pub fn with_devices(devices_json: &'static str) -> Self {
        Self::new(move |args| match args.first().map(String::as_str) {
            Some("list") => CommandOutput::success(devices_json),
            Some("inspect") => CommandOutput::success(r#"{"WhoAmI":1216,"Version":"1.2.0"}"#),
            _ => CommandOutput::success("Upload complete"),
        })
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose first argument is `subcommand`.
    pub fn calls_to(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|args| args.first().map(String::as_str) == Some(subcommand))
            .collect()
    }

    /// `--target` values of every upload, in call order.
    pub fn upload_targets(&self) -> Vec<String> {
        self.calls_to("upload")
            .iter()
            .filter_map(|args| {
                let idx = args.iter().position(|a| a == "--target")?;
                args.get(idx + 1).cloned()
            })
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, args: &[String]) -> Result<CommandOutput, RegulatorError> {
        self.calls.lock().unwrap().push(args.to_vec());
        Ok((self.handler)(args))
    }
}

/// Context with no deploy delays.
pub fn context(runner: FakeRunner) -> DeployContext<FakeRunner> {
    DeployContext::new(RegulatorClient::new(runner), &AppConfig::default())
        .with_timings(DeployTimings::immediate())
}

pub fn firmware_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b":100000000C9434000C9451000C9451000C945100B0\n").unwrap();
    path
}

pub fn messages(ctx: &DeployContext<FakeRunner>) -> Vec<String> {
    ctx.log().entries().map(|e| e.message.clone()).collect()
}

pub const THREE_BEHAVIOR_BOARDS: &str = r#"[
    {"Confidence":"High","Kind":"ATxmega","State":"Online","PortName":"COM3","WhoAmI":1216,"DeviceDescription":"Behavior","SerialNumber":1001,"FirmwareVersion":"1.1.0"},
    {"Confidence":"High","Kind":"ATxmega","State":"Online","PortName":"COM4","WhoAmI":1216,"DeviceDescription":"Behavior","SerialNumber":1002,"FirmwareVersion":"1.1.0"},
    {"Confidence":"High","Kind":"ATxmega","State":"Online","PortName":"COM5","WhoAmI":1216,"DeviceDescription":"Behavior","SerialNumber":1003,"FirmwareVersion":"1.1.0"}
]"#;

pub const ONE_PICO: &str = r#"[
    {"Confidence":"High","Kind":"Pico","State":"Online","PortName":"/dev/ttyACM0","WhoAmI":1405,"DeviceDescription":"EnvironmentSensor","SerialNumber":"E6614103E7"}
]"#;
