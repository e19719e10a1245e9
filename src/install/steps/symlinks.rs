//! Convenience links from the installation root to entry-point scripts

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use super::software_deployed;
use crate::install::core::{InstallError, InstallationContext, Step, StepEnv};
use crate::install::layout::ENTRY_POINT_LINKS;

pub const STEP: Step = Step::new("link entry points", true, software_deployed, run);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked { link: PathBuf, target: PathBuf },
    Skipped { name: &'static str },
}

/// Point `link` at `target`, replacing whatever file or link is already there.
fn replace_link(target: &Path, link: &Path) -> io::Result<()> {
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.is_dir() => {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "a directory is in the way",
            ));
        }
        Ok(_) => fs::remove_file(link)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    symlink(target, link)
}

pub fn link_entry_points(ctx: &InstallationContext) -> Result<Vec<LinkOutcome>, InstallError> {
    let software = ctx.software_dir();
    let mut outcomes = Vec::with_capacity(ENTRY_POINT_LINKS.len());

    for name in ENTRY_POINT_LINKS {
        let target = software.join(name);
        if !target.is_file() {
            outcomes.push(LinkOutcome::Skipped { name });
            continue;
        }
        let link = ctx.target_dir.join(name);
        replace_link(&target, &link).map_err(|e| InstallError::io("link", &link, e))?;
        outcomes.push(LinkOutcome::Linked { link, target });
    }
    Ok(outcomes)
}

fn run(env: &mut StepEnv<'_>) -> Result<(), InstallError> {
    for outcome in link_entry_points(env.ctx)? {
        match outcome {
            LinkOutcome::Linked { link, target } => {
                env.log.info(format!("Linked {} -> {}", link.display(), target.display()))
            }
            LinkOutcome::Skipped { name } => {
                env.log.info(format!("{name} is not part of this payload; no link created"))
            }
        }
    }
    Ok(())
}
