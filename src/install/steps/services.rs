//! Supervisor unit, reverse proxy and discovery advertisement

use crate::install::core::{InstallError, InstallationContext, Step, StepEnv};
use crate::install::services;

pub const STEP: Step = Step::new("install services", true, dashboard_deployed, run);

fn dashboard_deployed(ctx: &InstallationContext) -> Result<(), InstallError> {
    let entry = ctx.dashboard_entry();
    if entry.is_file() {
        Ok(())
    } else {
        Err(InstallError::DeploymentSource {
            group: super::deploy::PayloadGroup::DashboardEntry.name(),
            path: entry,
        })
    }
}

fn run(env: &mut StepEnv<'_>) -> Result<(), InstallError> {
    services::generate(env.ctx, env.backend, env.log)
}
