//! Application configuration.
//!
//! Read from a JSON file in the platform config directory. Every field is
//! optional; missing fields take their defaults. Unknown keys are rejected.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::activity::DEFAULT_LOG_CAPACITY;
use crate::error::{ConfigError, CoreError, RegulatorError};
use crate::types::DeviceKind;

/// Port the presentation layer serves its UI on.
pub const DEFAULT_UI_PORT: u16 = 4277;

/// Base name of the regulator executable.
pub const REGULATOR_NAME: &str = "HarpRegulator";

const CONFIG_FILE: &str = "config.json";

/// What the force flag is allowed to bypass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForcePolicy {
    /// Skip the device family / firmware extension check
    pub bypass_compatibility: bool,
    /// Skip the snapshot-wide deploy eligibility rules
    pub bypass_eligibility: bool,
    /// Families that always get `--force` on the regulator command line
    pub auto_force_kinds: Vec<DeviceKind>,
}

impl Default for ForcePolicy {
    fn default() -> Self {
        Self {
            bypass_compatibility: true,
            bypass_eligibility: false,
            auto_force_kinds: vec![DeviceKind::Pico],
        }
    }
}

/// Pauses between deploy steps, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployTimings {
    /// After closing device connections, for the OS to release port handles
    pub release_delay_ms: u64,
    /// Between successful uploads in a batch
    pub between_devices_ms: u64,
    /// After a single-device upload, for the device to reboot
    pub reboot_delay_ms: u64,
}

impl DeployTimings {
    /// No waiting at all.
    pub fn immediate() -> Self {
        Self {
            release_delay_ms: 0,
            between_devices_ms: 0,
            reboot_delay_ms: 0,
        }
    }

    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.release_delay_ms)
    }

    pub fn between_devices(&self) -> Duration {
        Duration::from_millis(self.between_devices_ms)
    }

    pub fn reboot_delay(&self) -> Duration {
        Duration::from_millis(self.reboot_delay_ms)
    }
}

impl Default for DeployTimings {
    fn default() -> Self {
        Self {
            release_delay_ms: 3000,
            between_devices_ms: 2000,
            reboot_delay_ms: 3000,
        }
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Explicit path to the regulator executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regulator_path: Option<PathBuf>,
    pub ui_port: u16,
    /// Native window instead of a browser tab
    pub native_window: bool,
    /// Let display refreshes open ports to enumerate missing metadata
    pub connect_on_refresh: bool,
    /// Include devices the regulator is not sure are Harp devices
    pub list_all: bool,
    pub log_capacity: usize,
    pub force: ForcePolicy,
    pub timings: DeployTimings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            regulator_path: None,
            ui_port: DEFAULT_UI_PORT,
            native_window: true,
            connect_on_refresh: true,
            list_all: true,
            log_capacity: DEFAULT_LOG_CAPACITY,
            force: ForcePolicy::default(),
            timings: DeployTimings::default(),
        }
    }
}

impl AppConfig {
    /// Platform config directory for the updater.
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "harp-tech", "harp-updater")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Self::default_dir()
            .map(|dir| dir.join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(CoreError::Io(e)),
        };

        let config: AppConfig = serde_json::from_str(&content).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Write to `path`, creating the parent directory if needed.
    pub async fn save(&self, path: &Path) -> Result<(), CoreError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::from)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ui_port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ui_port".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "log_capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Find the regulator executable.
    ///
    /// Order: `override_path` (flag or environment), the configured path, the
    /// `PATH`, then a copy bundled next to the running executable.
    pub fn resolve_regulator(&self, override_path: Option<&Path>) -> Result<PathBuf, RegulatorError> {
        if let Some(path) = override_path.or(self.regulator_path.as_deref()) {
            return Ok(path.to_path_buf());
        }

        if let Some(found) = search_path(&executable_name()) {
            return Ok(found);
        }

        if let Some(bundled) = bundled_regulator() {
            return Ok(bundled);
        }

        Err(RegulatorError::ExecutableNotFound(PathBuf::from(executable_name())))
    }
}

fn executable_name() -> String {
    format!("{}{}", REGULATOR_NAME, std::env::consts::EXE_SUFFIX)
}

fn search_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Runtime identifier of the bundled regulator build for this platform.
fn platform_rid() -> &'static str {
    match (std::env::consts::OS, std::env::consts::ARCH) {
        ("windows", "aarch64") => "win-arm64",
        ("windows", _) => "win-x64",
        ("macos", "aarch64") => "osx-arm64",
        ("macos", _) => "osx-x64",
        (_, "aarch64") => "linux-arm64",
        _ => "linux-x64",
    }
}

fn bundled_regulator() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe_dir = exe.parent()?;
    let name = executable_name();
    [
        exe_dir.join("harp_regulator").join(platform_rid()).join(&name),
        exe_dir.join("deps").join("harp_regulator").join(platform_rid()).join(&name),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}
