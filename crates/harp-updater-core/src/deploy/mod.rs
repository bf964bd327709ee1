//! Staged firmware deployment.
//!
//! A deploy runs four named stages in order. Validation failures abort before
//! the regulator is ever invoked; upload failures are recorded per device and
//! never stop the rest of a batch.

mod flow;

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

pub use flow::DeployContext;

/// Deploy stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployStage {
    Validating,
    ReleasingConnections,
    Uploading,
    RefreshingDevices,
}

impl DeployStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStage::Validating => "validating",
            DeployStage::ReleasingConnections => "releasing_connections",
            DeployStage::Uploading => "uploading",
            DeployStage::RefreshingDevices => "refreshing_devices",
        }
    }
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: DeployStage,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A request to flash one firmware file.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Snapshot id of the selected device
    pub device_id: String,
    pub firmware: PathBuf,
    /// Flash every device sharing the selected device's name
    pub batch: bool,
    pub force: bool,
}

impl DeployRequest {
    pub fn new(device_id: impl Into<String>, firmware: impl Into<PathBuf>) -> Self {
        Self {
            device_id: device_id.into(),
            firmware: firmware.into(),
            batch: false,
            force: false,
        }
    }

    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Result of flashing one device.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOutcome {
    pub device_id: String,
    pub display_name: String,
    /// Value passed to `--target`
    pub target: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The serial port was held by another process
    pub port_in_use: bool,
}

/// Everything a finished deploy produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub firmware: PathBuf,
    pub batch: bool,
    pub forced: bool,
    pub stages: Vec<StageRecord>,
    pub outcomes: Vec<DeviceOutcome>,
}

impl DeployReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn stage(&self, stage: DeployStage) -> Option<&StageRecord> {
        self.stages.iter().find(|r| r.stage == stage)
    }
}
