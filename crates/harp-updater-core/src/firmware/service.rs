//! Firmware inspection and device compatibility.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::descriptor::{extension_of, FirmwareDescriptor};
use crate::error::{CoreError, FirmwareError};
use crate::regulator::{CommandRunner, RegulatorClient};
use crate::types::{Device, DeviceKind, FirmwareType};

/// Firmware service with a per-path inspection cache.
///
/// The cache lives as long as the service and is never evicted. It is only
/// written through `&mut self`, so a single flow owns it at a time.
pub struct FirmwareService<R> {
    client: Arc<RegulatorClient<R>>,
    cache: HashMap<PathBuf, FirmwareDescriptor>,
}

impl<R: CommandRunner> FirmwareService<R> {
    pub fn new(client: Arc<RegulatorClient<R>>) -> Self {
        Self {
            client,
            cache: HashMap::new(),
        }
    }

    /// Describe a file from local facts only; never calls the regulator.
    ///
    /// Metadata from an earlier inspection of the same path is carried over.
    pub async fn describe(&self, path: &Path) -> Result<FirmwareDescriptor, CoreError> {
        let mut descriptor = FirmwareDescriptor::from_path(path).await?;
        if let Some(cached) = self.cache.get(path) {
            descriptor.metadata = cached.metadata.clone();
        }
        Ok(descriptor)
    }

    /// Describe a file and attach the regulator's `inspect` metadata.
    ///
    /// The file must exist locally before the regulator is asked. Successful
    /// results are cached by path; failures are not.
    pub async fn inspect(&mut self, path: &Path) -> Result<FirmwareDescriptor, CoreError> {
        let mut descriptor = FirmwareDescriptor::from_path(path).await?;

        if let Some(cached) = self.cache.get(path) {
            debug!(path = %path.display(), "firmware inspection served from cache");
            return Ok(cached.clone());
        }

        let metadata = self.client.inspect_firmware(path).await?;
        descriptor.metadata = Some(metadata);
        self.cache.insert(path.to_path_buf(), descriptor.clone());

        Ok(descriptor)
    }

    /// Number of cached inspections.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Check that `descriptor` can be flashed onto `device`.
    pub fn validate(
        &self,
        device: &Device,
        descriptor: &FirmwareDescriptor,
    ) -> Result<(), FirmwareError> {
        validate_kind(device.kind, &descriptor.extension)
    }

    /// Remote firmware catalog lookup. Not available; callers must not rely on it.
    pub async fn available_versions(&self, _device_type: &str) -> Result<Vec<String>, FirmwareError> {
        Err(FirmwareError::CatalogUnavailable)
    }

    /// Remote firmware download. Not available; callers must not rely on it.
    pub async fn download(
        &self,
        _version: &str,
        _device_type: &str,
        _dest: &Path,
    ) -> Result<PathBuf, FirmwareError> {
        Err(FirmwareError::CatalogUnavailable)
    }
}

/// Firmware type implied by the file extension, ignoring case.
pub fn firmware_type(path: &Path) -> Option<FirmwareType> {
    FirmwareType::from_extension(&extension_of(path))
}

/// Pico takes `.uf2`, ATxmega takes `.hex`; every other pairing is rejected.
pub fn validate_kind(kind: DeviceKind, extension: &str) -> Result<(), FirmwareError> {
    let expected = FirmwareType::required_by(kind);
    let found = FirmwareType::from_extension(extension);

    match (expected, found) {
        (Some(expected), Some(found)) if expected == found => Ok(()),
        _ => Err(FirmwareError::IncompatibleKind {
            kind,
            expected,
            extension: extension.to_ascii_lowercase(),
        }),
    }
}
