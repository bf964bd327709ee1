//! Local configuration commands.

use std::path::Path;

use crate::cli::{ConfigArgs, ConfigCommands};
use crate::error::CliError;
use crate::output::get_formatter;

use harp_updater_core::AppConfig;

/// Run the config command
pub async fn run_config(args: ConfigArgs, path: &Path, json: bool) -> Result<(), CliError> {
    let formatter = get_formatter(json);

    match args.command {
        ConfigCommands::Show => {
            let config = AppConfig::load(path).await?;
            println!("{}", formatter.format_config(&config, path));
        }
        ConfigCommands::Path => {
            println!("{}", formatter.format_message(&path.display().to_string()));
        }
        ConfigCommands::Init(args) => {
            if !args.force && tokio::fs::try_exists(path).await? {
                return Err(CliError::InvalidArgument(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            AppConfig::default().save(path).await?;
            println!(
                "{}",
                formatter.format_message(&format!(
                    "Wrote default configuration to {}",
                    path.display()
                ))
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigInitArgs;

    fn init(force: bool) -> ConfigArgs {
        ConfigArgs {
            command: ConfigCommands::Init(ConfigInitArgs { force }),
        }
    }

    #[tokio::test]
    async fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harp-updater").join("config.json");

        run_config(init(false), &path, true).await.unwrap();
        assert_eq!(AppConfig::load(&path).await.unwrap(), AppConfig::default());

        let err = run_config(init(false), &path, true).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));

        run_config(init(true), &path, true).await.unwrap();
    }
}
