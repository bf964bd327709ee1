//! Error types for the Harp updater core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{DeviceKind, FirmwareType};

/// Core error type for shared operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Regulator error: {0}")]
    Regulator(#[from] RegulatorError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Firmware error: {0}")]
    Firmware(#[from] FirmwareError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Whether this error was raised before anything was sent to the regulator.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::Firmware(FirmwareError::FileNotFound(_))
                | CoreError::Firmware(FirmwareError::IncompatibleKind { .. })
                | CoreError::Device(DeviceError::DeployBlocked(_))
        )
    }
}

/// Errors raised while talking to the external regulator executable.
#[derive(Debug, Error)]
pub enum RegulatorError {
    #[error("Regulator executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("'{command}' exited with {}: {}", exit_label(.code), .stderr.trim())]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to parse output of '{command}': {message}")]
    ParseError { command: String, message: String },

    #[error("Serial port for {target} is in use by another process: {}", .stderr.trim())]
    PortInUse { target: String, stderr: String },

    #[error("Failed to launch regulator: {0}")]
    Launch(#[source] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

/// Device snapshot and selection errors.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Device not found: {0}")]
    NotFound(String),

    #[error("No device selected")]
    NoSelection,

    #[error("Deployment blocked: {0}")]
    DeployBlocked(String),
}

/// Firmware file errors.
#[derive(Debug, Error)]
pub enum FirmwareError {
    #[error("Firmware file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{}", incompatible_message(.kind, .expected, .extension))]
    IncompatibleKind {
        kind: DeviceKind,
        expected: Option<FirmwareType>,
        extension: String,
    },

    #[error("Remote firmware catalog is not available")]
    CatalogUnavailable,
}

fn incompatible_message(
    kind: &DeviceKind,
    expected: &Option<FirmwareType>,
    extension: &str,
) -> String {
    if FirmwareType::from_extension(extension).is_none() {
        return format!("Unsupported firmware file type '{}'", display_ext(extension));
    }
    match expected {
        Some(expected) => format!(
            "{} devices require {} firmware files, got '{}'",
            kind,
            expected.extension(),
            display_ext(extension)
        ),
        None => format!("No firmware type is known to be compatible with {} devices", kind),
    }
}

fn display_ext(extension: &str) -> String {
    if extension.is_empty() {
        "(none)".to_string()
    } else {
        format!(".{}", extension)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("No platform configuration directory is available")]
    NoConfigDir,

    #[error("Invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
