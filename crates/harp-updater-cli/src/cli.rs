//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use harp_updater_core::{DeviceKind, HealthStatus};

/// Harp Updater - discover Harp devices and deploy firmware to them
#[derive(Parser, Debug)]
#[command(name = "harp-updater")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Exit non-zero when any device in a batch fails
    #[arg(long, global = true)]
    pub strict: bool,

    /// Path to the HarpRegulator executable
    #[arg(long, global = true, env = "HARP_REGULATOR")]
    pub regulator: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "HARP_UPDATER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List connected devices
    List(ListArgs),

    /// Inspect a firmware file
    Inspect(InspectArgs),

    /// Flash firmware onto a device or a batch of devices
    Deploy(DeployArgs),

    /// Install the USB drivers the regulator needs
    InstallDrivers,

    /// Local configuration
    Config(ConfigArgs),
}

// ==================== List ====================

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Allow the regulator to open ports to read missing device details
    #[arg(short, long)]
    pub connect: bool,

    /// Only report what the OS already knows; never open device ports
    #[arg(long, conflicts_with = "connect")]
    pub no_connect: bool,

    /// Only list devices positively identified as Harp devices
    #[arg(long)]
    pub harp_only: bool,

    /// Filter by device family
    #[arg(long, value_enum)]
    pub kind: Option<KindFilter>,

    /// Filter by health status
    #[arg(long, value_enum)]
    pub status: Option<StatusFilter>,

    /// Case-insensitive search over name, port, kind and serial number
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum KindFilter {
    Pico,
    Atxmega,
}

impl From<KindFilter> for DeviceKind {
    fn from(filter: KindFilter) -> Self {
        match filter {
            KindFilter::Pico => DeviceKind::Pico,
            KindFilter::Atxmega => DeviceKind::ATxmega,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusFilter {
    Healthy,
    Bootloader,
    Error,
    Unknown,
}

impl From<StatusFilter> for HealthStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Healthy => HealthStatus::Healthy,
            StatusFilter::Bootloader => HealthStatus::Bootloader,
            StatusFilter::Error => HealthStatus::Error,
            StatusFilter::Unknown => HealthStatus::Unknown,
        }
    }
}

// ==================== Inspect ====================

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Firmware file (.uf2 or .hex)
    pub firmware: PathBuf,

    /// Also check compatibility with this device id
    #[arg(short, long)]
    pub device: Option<String>,
}

// ==================== Deploy ====================

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Device id as shown by `list` (usually the port name)
    pub device: String,

    /// Firmware file (.uf2 or .hex)
    pub firmware: PathBuf,

    /// Flash every device with the same name as the selected one
    #[arg(short, long)]
    pub batch: bool,

    /// Force the upload past family checks
    #[arg(short, long)]
    pub force: bool,
}

// ==================== Config ====================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a configuration file with default values
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::try_parse_from([
            "harp-updater",
            "--json",
            "deploy",
            "COM3",
            "Behavior-1.2.0.hex",
            "--batch",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Deploy(args) => {
                assert_eq!(args.device, "COM3");
                assert!(args.batch);
                assert!(!args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = Cli::try_parse_from([
            "harp-updater",
            "list",
            "--kind",
            "atxmega",
            "--status",
            "bootloader",
        ])
        .unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.kind.map(DeviceKind::from), Some(DeviceKind::ATxmega));
                assert_eq!(args.status.map(HealthStatus::from), Some(HealthStatus::Bootloader));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_list_connect_flags_conflict() {
        let cli = Cli::try_parse_from(["harp-updater", "list", "--no-connect"]).unwrap();
        match cli.command {
            Commands::List(args) => assert!(args.no_connect && !args.connect),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(
            Cli::try_parse_from(["harp-updater", "list", "--connect", "--no-connect"]).is_err()
        );
    }

    #[test]
    fn test_deploy_requires_firmware() {
        assert!(Cli::try_parse_from(["harp-updater", "deploy", "COM3"]).is_err());
    }
}
