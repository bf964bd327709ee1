//! In-memory device snapshot backed by the regulator's `list` output.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::error::{CoreError, DeviceError};
use crate::regulator::{CommandRunner, ListOptions, RegulatorClient};
use crate::types::{Device, DeviceKind, HealthStatus};

use super::eligibility::check_deploy_eligibility;
use super::target::resolve_upload_target;

/// Criteria for narrowing the device table.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub kind: Option<DeviceKind>,
    pub health: Option<HealthStatus>,
    /// Case-insensitive substring over name, port, kind and serial number
    pub search: Option<String>,
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        if let Some(kind) = self.kind {
            if device.kind != kind {
                return false;
            }
        }
        if let Some(health) = self.health {
            if device.health() != health {
                return false;
            }
        }
        if let Some(query) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            let haystacks = [
                Some(device.display_name()),
                device.port_name.clone(),
                Some(device.kind.to_string()),
                device.serial_number.clone(),
            ];
            return haystacks
                .iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&query));
        }
        true
    }
}

/// Which device(s) a deploy is aimed at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub device_id: Option<String>,
    /// Target every device sharing the selected device's display name
    pub batch: bool,
}

/// Holds the current device snapshot and selection.
///
/// The snapshot is replaced wholesale on every refresh; records are never
/// patched in place.
pub struct DeviceManager<R> {
    client: Arc<RegulatorClient<R>>,
    devices: Vec<Device>,
    selection: Selection,
    list_all: bool,
}

impl<R: CommandRunner> DeviceManager<R> {
    pub fn new(client: Arc<RegulatorClient<R>>) -> Self {
        Self {
            client,
            devices: Vec::new(),
            selection: Selection::default(),
            list_all: true,
        }
    }

    /// Whether `list` should include devices that are not definitively Harp devices.
    pub fn with_list_all(mut self, list_all: bool) -> Self {
        self.list_all = list_all;
        self
    }

    /// Re-query the regulator and replace the snapshot.
    ///
    /// An empty list is a valid snapshot. On error the previous snapshot is kept.
    pub async fn refresh(&mut self, allow_connect: bool) -> Result<&[Device], CoreError> {
        let options = ListOptions {
            all: self.list_all,
            allow_connect,
        };
        let devices = self.client.list_devices(options).await?;
        self.replace_snapshot(devices);
        info!(count = self.devices.len(), allow_connect, "device snapshot refreshed");
        Ok(&self.devices)
    }

    /// Install a new snapshot, assigning snapshot-unique ids.
    pub fn replace_snapshot(&mut self, mut devices: Vec<Device>) {
        let mut seen: HashMap<String, usize> = HashMap::new();
        for device in &mut devices {
            let base = device.natural_id();
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            device.id = if *count == 1 {
                base
            } else {
                format!("{}#{}", base, count)
            };
        }
        self.devices = devices;

        let still_present = self
            .selection
            .device_id
            .as_ref()
            .is_some_and(|id| self.devices.iter().any(|d| &d.id == id));
        if !still_present {
            self.selection.device_id = None;
        }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Devices matching an arbitrary predicate, in snapshot order.
    pub fn filter<P>(&self, predicate: P) -> Vec<Device>
    where
        P: Fn(&Device) -> bool,
    {
        self.devices.iter().filter(|d| predicate(d)).cloned().collect()
    }

    pub fn filter_by(&self, filter: &DeviceFilter) -> Vec<Device> {
        self.filter(|d| filter.matches(d))
    }

    /// Select a device by id.
    pub fn select(&mut self, id: &str) -> Result<&Device, DeviceError> {
        let index = self
            .devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| DeviceError::NotFound(id.to_string()))?;
        self.selection.device_id = Some(self.devices[index].id.clone());
        Ok(&self.devices[index])
    }

    pub fn selected(&self) -> Option<&Device> {
        self.selection.device_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn set_batch(&mut self, batch: bool) {
        self.selection.batch = batch;
    }

    pub fn selection_state(&self) -> &Selection {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
    }

    /// Devices sharing `device`'s display name, in snapshot order.
    pub fn batch_members(&self, device: &Device) -> Vec<Device> {
        let name = device.display_name();
        self.filter(|d| d.display_name() == name)
    }

    /// Resolve the current selection into deploy targets.
    pub fn selection(&self) -> Result<Vec<Device>, DeviceError> {
        let selected = match &self.selection.device_id {
            Some(id) => self
                .get(id)
                .ok_or_else(|| DeviceError::NotFound(id.clone()))?,
            None => return Err(DeviceError::NoSelection),
        };

        if self.selection.batch {
            Ok(self.batch_members(selected))
        } else {
            Ok(vec![selected.clone()])
        }
    }

    /// Check the current selection against the snapshot's deploy rules.
    pub fn check_deploy_eligibility(&self) -> Result<(), DeviceError> {
        let selected = self.selected().ok_or(DeviceError::NoSelection)?;
        check_deploy_eligibility(&self.devices, selected, self.selection.batch)
    }

    pub fn resolve_upload_target(&self, device: &Device) -> String {
        resolve_upload_target(device)
    }

    pub fn client(&self) -> &RegulatorClient<R> {
        &self.client
    }
}
