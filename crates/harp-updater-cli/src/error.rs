//! Error types for the Harp Updater CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use harp_updater_core::error::CoreError;
use thiserror::Error;

pub use harp_updater_core::error::{ConfigError, DeviceError, FirmwareError, RegulatorError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const REGULATOR_ERROR: i32 = 2;
    pub const DEVICE_ERROR: i32 = 3;
    pub const INVALID_ARGS: i32 = 4;
    pub const PARTIAL_FAILURE: i32 = 5;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Upload to {device} failed: {message}")]
    UploadFailed { device: String, message: String },

    #[error("Partial failure: {succeeded} succeeded, {failed} failed")]
    PartialFailure { succeeded: usize, failed: usize },

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e {
                CoreError::Regulator(_) => exit_codes::REGULATOR_ERROR,
                CoreError::Device(_) => exit_codes::DEVICE_ERROR,
                CoreError::Firmware(FirmwareError::CatalogUnavailable) => exit_codes::GENERAL_ERROR,
                CoreError::Firmware(_) => exit_codes::INVALID_ARGS,
                CoreError::Config(_) => exit_codes::GENERAL_ERROR,
                CoreError::Io(_) => exit_codes::GENERAL_ERROR,
                CoreError::Other(_) => exit_codes::GENERAL_ERROR,
            },
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::UploadFailed { .. } => exit_codes::REGULATOR_ERROR,
            CliError::PartialFailure { .. } => exit_codes::PARTIAL_FAILURE,
            CliError::Other(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

// Conversions from core error subtypes to CliError
impl From<RegulatorError> for CliError {
    fn from(e: RegulatorError) -> Self {
        CliError::Core(CoreError::Regulator(e))
    }
}

impl From<DeviceError> for CliError {
    fn from(e: DeviceError) -> Self {
        CliError::Core(CoreError::Device(e))
    }
}

impl From<FirmwareError> for CliError {
    fn from(e: FirmwareError) -> Self {
        CliError::Core(CoreError::Firmware(e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Core(CoreError::Config(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
