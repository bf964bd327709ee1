//! Firmware file descriptor.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CoreError, FirmwareError};
use crate::types::{DeviceKind, FirmwareType};

/// What is known about a firmware file: local facts plus, once inspected,
/// the regulator's metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmwareDescriptor {
    pub path: PathBuf,
    /// Lowercased extension without the dot; empty when the file has none
    pub extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_type: Option<FirmwareType>,
    pub size: u64,
    /// Device family this image is built for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_kind: Option<DeviceKind>,
    /// Object returned by `inspect --json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl FirmwareDescriptor {
    /// Build a descriptor from the local file only. Fails if the file is missing.
    pub async fn from_path(path: &Path) -> Result<Self, CoreError> {
        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(FirmwareError::FileNotFound(path.to_path_buf()).into()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FirmwareError::FileNotFound(path.to_path_buf()).into())
            }
            Err(e) => return Err(CoreError::Io(e)),
        };

        let extension = extension_of(path);
        let firmware_type = FirmwareType::from_extension(&extension);

        Ok(Self {
            path: path.to_path_buf(),
            extension,
            firmware_type,
            size: meta.len(),
            target_kind: firmware_type.map(|t| t.target_kind()),
            metadata: None,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// WhoAmI the image was built for, when the regulator reported one.
    pub fn who_am_i(&self) -> Option<u64> {
        self.metadata.as_ref()?.get("WhoAmI")?.as_u64()
    }

    /// Firmware version string, when the regulator reported one.
    pub fn version(&self) -> Option<String> {
        let metadata = self.metadata.as_ref()?;
        ["FirmwareVersion", "Version"]
            .iter()
            .find_map(|key| metadata.get(*key))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }

    /// Best label for log lines: the reported version, else the file name.
    pub fn label(&self) -> String {
        self.version().unwrap_or_else(|| self.file_name())
    }
}

/// Lowercased extension of `path`, without the dot.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sensor-0.3.0.UF2");
        std::fs::write(&path, b"UF2\n0123456789").unwrap();

        let desc = FirmwareDescriptor::from_path(&path).await.unwrap();
        assert_eq!(desc.extension, "uf2");
        assert_eq!(desc.firmware_type, Some(FirmwareType::Uf2));
        assert_eq!(desc.target_kind, Some(DeviceKind::Pico));
        assert_eq!(desc.size, 14);
        assert_eq!(desc.label(), "Sensor-0.3.0.UF2");
    }

    #[tokio::test]
    async fn test_from_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = FirmwareDescriptor::from_path(&dir.path().join("nope.hex"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Firmware(FirmwareError::FileNotFound(_))));

        let err = FirmwareDescriptor::from_path(dir.path()).await.unwrap_err();
        assert!(matches!(err, CoreError::Firmware(FirmwareError::FileNotFound(_))));
    }

    #[test]
    fn test_metadata_accessors() {
        let mut metadata = Map::new();
        metadata.insert("WhoAmI".to_string(), serde_json::json!(1405));
        metadata.insert("Version".to_string(), serde_json::json!("1.0.0"));
        let desc = FirmwareDescriptor {
            path: PathBuf::from("fw.uf2"),
            extension: "uf2".to_string(),
            firmware_type: Some(FirmwareType::Uf2),
            size: 0,
            target_kind: Some(DeviceKind::Pico),
            metadata: Some(metadata),
        };
        assert_eq!(desc.who_am_i(), Some(1405));
        assert_eq!(desc.version().as_deref(), Some("1.0.0"));
        assert_eq!(desc.label(), "1.0.0");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/b.HEX")), "hex");
        assert_eq!(extension_of(Path::new("firmware")), "");
    }
}
