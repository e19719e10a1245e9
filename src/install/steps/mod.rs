//! The provisioning steps, in pipeline order

pub mod crontab;
pub mod dependencies;
pub mod deploy;
pub mod migrate;
pub mod permissions;
pub mod scaffold;
pub mod services;
pub mod symlinks;
pub mod validate;

use super::core::{InstallError, InstallationContext, Step};

pub fn standard_steps() -> Vec<Step> {
    vec![
        validate::STEP,
        dependencies::STEP,
        scaffold::STEP,
        deploy::STEP,
        migrate::STEP,
        permissions::STEP,
        symlinks::STEP,
        services::STEP,
        crontab::STEP,
    ]
}

/// Precondition shared by the steps that work on deployed scripts.
pub(crate) fn software_deployed(ctx: &InstallationContext) -> Result<(), InstallError> {
    let software = ctx.software_dir();
    if super::file_ops::has_entries(&software) {
        Ok(())
    } else {
        Err(InstallError::DeploymentSource {
            group: deploy::PayloadGroup::Scripts.name(),
            path: software,
        })
    }
}
