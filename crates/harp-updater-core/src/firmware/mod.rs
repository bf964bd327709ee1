//! Firmware files: local description, regulator inspection and compatibility.

pub mod descriptor;
pub mod service;

pub use descriptor::FirmwareDescriptor;
pub use service::{firmware_type, validate_kind, FirmwareService};
