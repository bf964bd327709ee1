use std::sync::Arc;

use tracing::{info, warn};

use super::{DeployReport, DeployRequest, DeployStage, DeviceOutcome, StageRecord, StageStatus};
use crate::activity::{ActivityLog, LogSink};
use crate::config::{AppConfig, DeployTimings, ForcePolicy};
use crate::device::{resolve_upload_target, DeviceManager};
use crate::error::{CoreError, RegulatorError};
use crate::firmware::{FirmwareDescriptor, FirmwareService};
use crate::regulator::{CommandRunner, RegulatorClient, UploadOptions};
use crate::types::{Device, DeviceKind};

/// Targets and firmware settled during validation.
struct DeployPlan {
    descriptor: FirmwareDescriptor,
    targets: Vec<(Device, String)>,
}

/// Owns every service a deploy touches.
///
/// One context per process; front ends hold it instead of reaching for
/// globals.
pub struct DeployContext<R> {
    client: Arc<RegulatorClient<R>>,
    devices: DeviceManager<R>,
    firmware: FirmwareService<R>,
    log: ActivityLog,
    policy: ForcePolicy,
    timings: DeployTimings,
    connect_on_refresh: bool,
}

impl<R: CommandRunner> DeployContext<R> {
    pub fn new(client: RegulatorClient<R>, config: &AppConfig) -> Self {
        let client = Arc::new(client);
        Self {
            devices: DeviceManager::new(Arc::clone(&client)).with_list_all(config.list_all),
            firmware: FirmwareService::new(Arc::clone(&client)),
            client,
            log: ActivityLog::new(config.log_capacity),
            policy: config.force.clone(),
            timings: config.timings.clone(),
            connect_on_refresh: config.connect_on_refresh,
        }
    }

    /// Forward every activity entry to `sink` as it is written.
    pub fn with_sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.log = std::mem::take(&mut self.log).with_sink(sink);
        self
    }

    pub fn with_timings(mut self, timings: DeployTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_policy(mut self, policy: ForcePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn client(&self) -> &RegulatorClient<R> {
        &self.client
    }

    pub fn devices(&self) -> &DeviceManager<R> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut DeviceManager<R> {
        &mut self.devices
    }

    pub fn firmware(&self) -> &FirmwareService<R> {
        &self.firmware
    }

    pub fn firmware_mut(&mut self) -> &mut FirmwareService<R> {
        &mut self.firmware
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ActivityLog {
        &mut self.log
    }

    pub fn policy(&self) -> &ForcePolicy {
        &self.policy
    }

    /// Display refresh, honoring the configured connect setting.
    pub async fn refresh(&mut self) -> Result<&[Device], CoreError> {
        self.devices.refresh(self.connect_on_refresh).await
    }

    /// Run a deploy through all four stages.
    ///
    /// Returns `Err` only when the deploy never reached the upload stage.
    /// Per-device upload failures are reported in the returned report.
    pub async fn deploy(&mut self, request: DeployRequest) -> Result<DeployReport, CoreError> {
        let mut stages = Vec::with_capacity(4);

        info!(stage = %DeployStage::Validating, device = %request.device_id, "deploy stage");
        let plan = match self.validate(&request).await {
            Ok(plan) => plan,
            Err(e) => {
                match &e {
                    CoreError::Firmware(_) => self.log.error(format!("Invalid firmware file: {}", e)),
                    _ => self.log.error(e.to_string()),
                }
                return Err(e);
            }
        };
        stages.push(completed(DeployStage::Validating));

        info!(stage = %DeployStage::ReleasingConnections, "deploy stage");
        self.log.info("Closing device connections...");
        if let Err(e) = self.devices.refresh(false).await {
            self.log.error(format!("Failed to close device connections: {}", e));
            return Err(e);
        }
        tokio::time::sleep(self.timings.release_delay()).await;
        stages.push(completed(DeployStage::ReleasingConnections));

        info!(stage = %DeployStage::Uploading, targets = plan.targets.len(), "deploy stage");
        let batch = plan.targets.len() > 1;
        let outcomes = self.upload_all(&plan, request.force, batch).await;
        let failed = outcomes.iter().filter(|o| !o.success).count();
        let succeeded = outcomes.len() - failed;

        if batch {
            let summary = format!("Batch update complete: {}/{} successful", succeeded, outcomes.len());
            if failed == 0 {
                self.log.success(summary);
                self.log.success("All devices updated successfully!");
            } else {
                self.log.warning(summary);
                self.log.error(format!("{} device(s) failed to update", failed));
            }
        }
        stages.push(if failed == 0 {
            completed(DeployStage::Uploading)
        } else {
            StageRecord {
                stage: DeployStage::Uploading,
                status: StageStatus::Failed,
                message: Some(format!("{} of {} device(s) failed", failed, outcomes.len())),
            }
        });

        info!(stage = %DeployStage::RefreshingDevices, "deploy stage");
        match self.devices.refresh(self.connect_on_refresh).await {
            Ok(_) => stages.push(completed(DeployStage::RefreshingDevices)),
            Err(e) => {
                self.log.warning(format!("Device refresh failed: {}", e));
                stages.push(StageRecord {
                    stage: DeployStage::RefreshingDevices,
                    status: StageStatus::Failed,
                    message: Some(e.to_string()),
                });
            }
        }

        Ok(DeployReport {
            firmware: plan.descriptor.path,
            batch,
            forced: request.force,
            stages,
            outcomes,
        })
    }

    async fn validate(&mut self, request: &DeployRequest) -> Result<DeployPlan, CoreError> {
        let selected = self.devices.select(&request.device_id)?.clone();
        self.devices.set_batch(request.batch);
        let targets = self.devices.selection()?;

        if targets.len() > 1 {
            self.log.info(format!(
                "Starting batch firmware update for {} {} devices",
                targets.len(),
                selected.display_name()
            ));
            self.log.info(format!("Target firmware: {}", request.firmware.display()));
        } else {
            self.log.info(format!("Starting firmware update for {}", selected.display_name()));
        }

        if let Err(e) = self.devices.check_deploy_eligibility() {
            if !(request.force && self.policy.bypass_eligibility) {
                return Err(e.into());
            }
            self.log.warning(format!("Ignoring device check: {}", e));
        }

        self.log.info(format!("Validating firmware file: {}", request.firmware.display()));
        let descriptor = self.firmware.describe(&request.firmware).await?;

        for device in &targets {
            if let Err(e) = self.firmware.validate(device, &descriptor) {
                if !self.may_force_past(request, device, &descriptor) {
                    return Err(e.into());
                }
                self.log.warning(format!("Forcing past check on {}: {}", device.display_name(), e));
            }
        }
        self.log.success("Firmware file validated");

        let targets = targets
            .into_iter()
            .map(|device| {
                let target = resolve_upload_target(&device);
                (device, target)
            })
            .collect();

        Ok(DeployPlan { descriptor, targets })
    }

    /// A family mismatch may be forced; an unsupported extension or an
    /// unknown family may not.
    fn may_force_past(
        &self,
        request: &DeployRequest,
        device: &Device,
        descriptor: &FirmwareDescriptor,
    ) -> bool {
        request.force
            && self.policy.bypass_compatibility
            && descriptor.firmware_type.is_some()
            && device.kind != DeviceKind::Unknown
    }

    async fn upload_all(&mut self, plan: &DeployPlan, force: bool, batch: bool) -> Vec<DeviceOutcome> {
        let total = plan.targets.len();
        let mut outcomes = Vec::with_capacity(total);

        for (idx, (device, target)) in plan.targets.iter().enumerate() {
            let name = device.display_name();
            let port = device.port_name.as_deref().unwrap_or(target.as_str());

            if batch {
                self.log.info(format!("--- Device {}/{}: {} ({}) ---", idx + 1, total, name, port));
            }
            if force {
                self.log.warning(format!("Starting FORCED firmware upload to {}...", name));
            } else {
                self.log.info(format!("Starting firmware upload to {} ({})...", name, port));
            }

            let options = UploadOptions {
                force: force || self.policy.auto_force_kinds.contains(&device.kind),
                ..UploadOptions::default()
            };
            let result = self
                .client
                .upload_firmware(&plan.descriptor.path, target, options)
                .await;

            let outcome = match result {
                Ok(output) => {
                    self.log.success(format!("Firmware uploaded successfully to {}", name));
                    if batch && idx + 1 < total {
                        self.log.info("Waiting before next device...");
                        tokio::time::sleep(self.timings.between_devices()).await;
                    } else if !batch {
                        self.log.info("Verifying firmware installation...");
                        self.log.info("Waiting for device to reboot...");
                        tokio::time::sleep(self.timings.reboot_delay()).await;
                        self.log.success("Firmware verified");
                    }
                    DeviceOutcome {
                        device_id: device.id.clone(),
                        display_name: name,
                        target: target.clone(),
                        success: true,
                        output: Some(output),
                        error: None,
                        port_in_use: false,
                    }
                }
                Err(e) => {
                    warn!(device = %device.id, target = %target, error = %e, "upload failed");
                    self.log.error(format!("Upload failed for {}: {}", name, e));
                    DeviceOutcome {
                        device_id: device.id.clone(),
                        display_name: name,
                        target: target.clone(),
                        success: false,
                        output: None,
                        port_in_use: matches!(e, RegulatorError::PortInUse { .. }),
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}

fn completed(stage: DeployStage) -> StageRecord {
    StageRecord {
        stage,
        status: StageStatus::Completed,
        message: None,
    }
}
