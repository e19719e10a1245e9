//! Target directory skeleton

use std::fs;
use std::path::PathBuf;

use crate::install::core::{InstallError, InstallationContext, Step, StepEnv, always};
use crate::install::layout::STATIC_SUBDIRS;

pub const STEP: Step = Step::new("scaffold target tree", true, always, run);

/// Every directory the scaffold creates, parents before children.
pub fn skeleton(ctx: &InstallationContext) -> Vec<PathBuf> {
    let mut dirs = vec![
        ctx.target_dir.clone(),
        ctx.software_dir(),
        ctx.photos_dir(),
        ctx.backup_photos_dir(),
        ctx.logs_dir(),
        ctx.web_dir(),
        ctx.static_dir(),
    ];
    dirs.extend(STATIC_SUBDIRS.iter().map(|sub| ctx.static_dir().join(sub)));
    dirs
}

pub fn create_skeleton(ctx: &InstallationContext) -> Result<usize, InstallError> {
    let mut created = 0;
    for dir in skeleton(ctx) {
        if dir.is_dir() {
            continue;
        }
        fs::create_dir_all(&dir).map_err(|e| InstallError::io("create", &dir, e))?;
        created += 1;
    }
    Ok(created)
}

fn run(env: &mut StepEnv<'_>) -> Result<(), InstallError> {
    let created = create_skeleton(env.ctx)?;
    if created == 0 {
        env.log.info(format!("Target tree {} already in place", env.ctx.target_dir.display()));
    } else {
        env.log.info(format!(
            "Created {created} directories under {}",
            env.ctx.target_dir.display()
        ));
    }
    Ok(())
}
