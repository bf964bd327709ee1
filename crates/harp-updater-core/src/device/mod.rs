//! Device snapshot, selection and upload targeting.

pub mod eligibility;
pub mod manager;
pub mod target;

pub use eligibility::check_deploy_eligibility;
pub use manager::{DeviceFilter, DeviceManager, Selection};
pub use target::{resolve_upload_target, BOOTLOADER_TARGETS};
