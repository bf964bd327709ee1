//! Argument builders for `HarpRegulator` subcommands.

use std::path::Path;

/// Options for the `list` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Include devices that are not definitively Harp devices
    pub all: bool,
    /// Allow opening ports to fill in missing metadata
    pub allow_connect: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            all: true,
            allow_connect: true,
        }
    }
}

/// Options for the `upload` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Skip the regulator's own safety checks
    pub force: bool,
    /// Let the regulator prompt on its own stdin
    pub interactive: bool,
    pub progress: bool,
    /// Reboot the device after a successful upload
    pub reboot: bool,
    pub verbose: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            force: false,
            interactive: false,
            progress: true,
            reboot: true,
            verbose: false,
        }
    }
}

/// Command builders for the regulator CLI
pub struct Commands;

impl Commands {
    pub fn list(options: ListOptions) -> Vec<String> {
        let mut args = vec!["list".to_string(), "--json".to_string()];
        if options.all {
            args.push("--all".to_string());
        }
        if options.allow_connect {
            args.push("--allow-connect".to_string());
        }
        args
    }

    pub fn inspect(firmware: &Path) -> Vec<String> {
        vec![
            "inspect".to_string(),
            firmware.to_string_lossy().into_owned(),
            "--json".to_string(),
        ]
    }

    pub fn upload(firmware: &Path, target: &str, options: UploadOptions) -> Vec<String> {
        let mut args = vec![
            "upload".to_string(),
            firmware.to_string_lossy().into_owned(),
            "--target".to_string(),
            target.to_string(),
        ];
        if options.force {
            args.push("--force".to_string());
        }
        if !options.interactive {
            args.push("--no-interactive".to_string());
        }
        args.push(if options.progress { "--progress" } else { "--no-progress" }.to_string());
        if !options.reboot {
            args.push("--no-reboot".to_string());
        }
        if options.verbose {
            args.push("--verbose".to_string());
        }
        args
    }

    pub fn install_drivers() -> Vec<String> {
        vec!["install-drivers".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_args() {
        assert_eq!(
            Commands::list(ListOptions::default()),
            vec!["list", "--json", "--all", "--allow-connect"]
        );
        assert_eq!(
            Commands::list(ListOptions {
                all: false,
                allow_connect: false
            }),
            vec!["list", "--json"]
        );
    }

    #[test]
    fn test_inspect_args() {
        assert_eq!(
            Commands::inspect(Path::new("fw.uf2")),
            vec!["inspect", "fw.uf2", "--json"]
        );
    }

    #[test]
    fn test_upload_args_default() {
        assert_eq!(
            Commands::upload(Path::new("fw.hex"), "COM3", UploadOptions::default()),
            vec!["upload", "fw.hex", "--target", "COM3", "--no-interactive", "--progress"]
        );
    }

    #[test]
    fn test_upload_args_all_flags() {
        let options = UploadOptions {
            force: true,
            interactive: true,
            progress: false,
            reboot: false,
            verbose: true,
        };
        assert_eq!(
            Commands::upload(Path::new("fw.uf2"), "PICOBOOT", options),
            vec![
                "upload",
                "fw.uf2",
                "--target",
                "PICOBOOT",
                "--force",
                "--no-progress",
                "--no-reboot",
                "--verbose"
            ]
        );
    }
}
