//! CreatureBox provisioning
//!
//! A fixed pipeline of steps takes a CreatureBox checkout and turns a fresh
//! Raspberry Pi into a capture station: packages, target tree, payload,
//! legacy path migration, permissions, entry-point links, the dashboard's
//! systemd/nginx/avahi services and an example crontab.

pub mod backend;
pub mod core;
mod file_ops;
pub mod layout;
pub mod linux;
pub mod recording;
pub mod runners;
pub mod services;
pub mod steps;
mod wizard;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{ProvisioningBackend, SystemPaths};
pub use self::core::{
    InstallError, InstallLog, InstallSummary, InstallationContext, LegacyPathTable, Pipeline,
    PipelineFailure, PipelineState,
};
pub use linux::SystemBackend;
pub use recording::{BackendAction, FailurePoint, RecordingBackend};
pub use wizard::WizardAnswers;
