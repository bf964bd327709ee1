//! Harp Updater - core library
//!
//! Discovers Harp devices and flashes firmware onto them by driving the
//! `HarpRegulator` command-line tool. Front ends build a [`DeployContext`]
//! and feed it device selections and firmware paths.

pub mod activity;
pub mod config;
pub mod deploy;
pub mod device;
pub mod error;
pub mod firmware;
pub mod regulator;
pub mod types;

pub use activity::{ActivityLog, LogEntry, LogLevel, LogSink};
pub use config::{AppConfig, DeployTimings, ForcePolicy};
pub use deploy::{DeployContext, DeployReport, DeployRequest, DeployStage};
pub use error::{CoreError, Result};
pub use regulator::{ProcessRunner, RegulatorClient};
pub use types::{Device, DeviceKind, DeviceState, FirmwareType, HealthStatus};
