//! Firmware deployment.

use crate::cli::DeployArgs;
use crate::console::spinner;
use crate::error::CliError;
use crate::output::get_formatter;

use harp_updater_core::deploy::{DeployReport, DeployRequest};
use harp_updater_core::AppConfig;

use super::{open_context, Options};

/// Run the deploy command
pub async fn run_deploy(args: DeployArgs, config: &AppConfig, opts: &Options) -> Result<(), CliError> {
    let mut ctx = open_context(config, opts)?;
    let formatter = get_formatter(opts.json);

    let pb = spinner("Scanning for devices...", opts.json);
    let refreshed = ctx.refresh().await.map(|devices| devices.len());
    pb.finish_and_clear();
    refreshed?;

    let request = DeployRequest::new(args.device, args.firmware)
        .batch(args.batch)
        .force(args.force);
    let report = ctx.deploy(request).await?;

    println!("{}", formatter.format_deploy_report(&report));

    report_result(&report, opts.strict)
}

/// Map a finished deploy onto the process result.
///
/// A failed single-device upload is an error. A batch with failures only
/// fails the process under `--strict`.
fn report_result(report: &DeployReport, strict: bool) -> Result<(), CliError> {
    if report.all_succeeded() {
        return Ok(());
    }

    if !report.batch {
        if let Some(outcome) = report.outcomes.iter().find(|o| !o.success) {
            return Err(CliError::UploadFailed {
                device: outcome.display_name.clone(),
                message: outcome.error.clone().unwrap_or_default(),
            });
        }
    }

    if strict {
        return Err(CliError::PartialFailure {
            succeeded: report.succeeded(),
            failed: report.failed(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::error::exit_codes;
    use harp_updater_core::deploy::DeviceOutcome;

    fn outcome(id: &str, success: bool) -> DeviceOutcome {
        DeviceOutcome {
            device_id: id.to_string(),
            display_name: "Behavior".to_string(),
            target: id.to_string(),
            success,
            output: None,
            error: (!success).then(|| "exited with exit code 2".to_string()),
            port_in_use: false,
        }
    }

    fn report(outcomes: Vec<DeviceOutcome>) -> DeployReport {
        DeployReport {
            firmware: PathBuf::from("Behavior.hex"),
            batch: outcomes.len() > 1,
            forced: false,
            stages: Vec::new(),
            outcomes,
        }
    }

    #[test]
    fn test_all_succeeded_is_ok() {
        let batch = report(vec![outcome("COM3", true), outcome("COM4", true)]);
        assert!(report_result(&batch, true).is_ok());
        assert!(report_result(&report(vec![outcome("COM3", true)]), true).is_ok());
    }

    #[test]
    fn test_single_failure_is_upload_error() {
        let err = report_result(&report(vec![outcome("COM3", false)]), false).unwrap_err();
        match &err {
            CliError::UploadFailed { device, message } => {
                assert_eq!(device, "Behavior");
                assert_eq!(message, "exited with exit code 2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.exit_code(), exit_codes::REGULATOR_ERROR);
    }

    #[test]
    fn test_batch_failure_needs_strict() {
        let batch = report(vec![
            outcome("COM3", true),
            outcome("COM4", false),
            outcome("COM5", true),
        ]);
        assert!(report_result(&batch, false).is_ok());

        let err = report_result(&batch, true).unwrap_err();
        assert!(matches!(
            err,
            CliError::PartialFailure {
                succeeded: 2,
                failed: 1
            }
        ));
        assert_eq!(err.exit_code(), exit_codes::PARTIAL_FAILURE);
    }
}
