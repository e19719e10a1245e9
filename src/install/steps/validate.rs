//! Source-tree check run before anything is mutated

use std::path::PathBuf;

use crate::install::core::{InstallError, InstallationContext, Step, StepEnv};
use crate::install::layout::{self, *};

pub const STEP: Step = Step::new("validate source tree", true, source_is_directory, run);

/// Directories and files the payload must provide, relative to the source root.
#[derive(Debug, Clone, Copy)]
pub struct RepositoryManifest {
    pub directories: &'static [&'static str],
    pub files: &'static [&'static str],
}

pub const MANIFEST: RepositoryManifest = RepositoryManifest {
    directories: &[
        SOURCE_SOFTWARE_DIR,
        SOURCE_CONFIG_DIR,
        SOURCE_WEB_DIR,
        SOURCE_STATIC_DIR,
    ],
    files: &[
        "src/software/TakePhoto.py",
        "src/software/Scheduler.py",
        "src/config/camera_settings.csv",
        "src/config/schedule_settings.csv",
        "src/config/controls.txt",
        "src/web/app.py",
    ],
};

impl RepositoryManifest {
    /// First required path missing from `ctx.source_root`, directories first.
    pub fn first_missing(&self, ctx: &InstallationContext) -> Option<PathBuf> {
        let dirs = self
            .directories
            .iter()
            .map(|d| ctx.source_path(d))
            .find(|p| !p.is_dir());
        dirs.or_else(|| {
            self.files
                .iter()
                .map(|f| ctx.source_path(f))
                .find(|p| !p.is_file())
        })
    }

    pub fn check(&self, ctx: &InstallationContext) -> Result<(), InstallError> {
        match self.first_missing(ctx) {
            Some(path) => Err(InstallError::RepositoryStructure { path }),
            None => Ok(()),
        }
    }
}

fn source_is_directory(ctx: &InstallationContext) -> Result<(), InstallError> {
    if ctx.source_root.is_dir() {
        Ok(())
    } else {
        Err(InstallError::RepositoryStructure {
            path: ctx.source_root.clone(),
        })
    }
}

fn run(env: &mut StepEnv<'_>) -> Result<(), InstallError> {
    MANIFEST.check(env.ctx)?;
    if !env.ctx.source_path(layout::REQUIREMENTS_MANIFEST).is_file() {
        env.log.info(format!(
            "No {} in the source tree; runtime requirements will be skipped",
            layout::REQUIREMENTS_MANIFEST
        ));
    }
    env.log.info(format!(
        "Source tree {} has every required path",
        env.ctx.source_root.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::install::test_support::PayloadFixture;

    #[test]
    fn complete_tree_passes() {
        let payload = PayloadFixture::complete();
        assert!(MANIFEST.check(&payload.context()).is_ok());
    }

    #[test]
    fn names_exactly_the_missing_path() {
        let all = MANIFEST.directories.iter().chain(MANIFEST.files);
        for required in all {
            let payload = PayloadFixture::complete();
            let path = payload.source().join(required);
            if path.is_dir() {
                fs::remove_dir_all(&path).unwrap();
            } else {
                fs::remove_file(&path).unwrap();
            }

            let err = MANIFEST.check(&payload.context()).unwrap_err();
            match err {
                InstallError::RepositoryStructure { path: missing } => {
                    assert_eq!(missing, path, "removed {required}")
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn missing_source_root_fails_the_precondition() {
        let ctx = InstallationContext::new("/nonexistent/creaturebox", "/opt/example");
        let err = STEP.check(&ctx).unwrap_err();
        assert_eq!(err.kind(), "RepositoryStructureError");
    }

    #[test]
    fn manifest_paths_agree_with_the_layout() {
        for (dir, file) in [
            (SOURCE_SOFTWARE_DIR, CAPTURE_SCRIPT),
            (SOURCE_SOFTWARE_DIR, SCHEDULER_SCRIPT),
            (SOURCE_CONFIG_DIR, CAMERA_SETTINGS),
            (SOURCE_CONFIG_DIR, SCHEDULE_SETTINGS),
            (SOURCE_CONFIG_DIR, CONTROL_FLAGS),
            (SOURCE_WEB_DIR, DASHBOARD_ENTRY),
        ] {
            let joined = format!("{dir}/{file}");
            assert!(MANIFEST.files.contains(&joined.as_str()), "{joined}");
        }
    }
}
