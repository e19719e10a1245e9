//! Named unit of provisioning work

use std::fmt;

use super::context::InstallationContext;
use super::error::InstallError;
use super::install_log::InstallLog;
use crate::install::backend::ProvisioningBackend;

/// Everything a step may touch while it runs.
pub struct StepEnv<'a> {
    pub ctx: &'a InstallationContext,
    pub backend: &'a dyn ProvisioningBackend,
    pub log: &'a mut InstallLog,
}

pub type Precondition = fn(&InstallationContext) -> Result<(), InstallError>;
pub type Action = fn(&mut StepEnv<'_>) -> Result<(), InstallError>;

#[derive(Clone, Copy)]
pub struct Step {
    pub name: &'static str,
    /// Safe to repeat with the same inputs.
    pub idempotent: bool,
    precondition: Precondition,
    action: Action,
}

impl Step {
    pub const fn new(
        name: &'static str,
        idempotent: bool,
        precondition: Precondition,
        action: Action,
    ) -> Self {
        Self {
            name,
            idempotent,
            precondition,
            action,
        }
    }

    pub fn check(&self, ctx: &InstallationContext) -> Result<(), InstallError> {
        (self.precondition)(ctx)
    }

    pub fn run(&self, env: &mut StepEnv<'_>) -> Result<(), InstallError> {
        (self.action)(env)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("idempotent", &self.idempotent)
            .finish_non_exhaustive()
    }
}

/// Precondition for steps that may always run.
pub fn always(_: &InstallationContext) -> Result<(), InstallError> {
    Ok(())
}
