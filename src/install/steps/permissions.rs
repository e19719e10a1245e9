//! Normalizes modes on the deployed tree
//!
//! Failures here are logged and skipped; nothing later in the pipeline
//! depends on exact modes.

use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use super::software_deployed;
use crate::install::core::{InstallError, InstallationContext, Step, StepEnv};
use crate::install::layout::{self, SCRIPT_EXTENSIONS};

pub const STEP: Step = Step::new("set permissions", true, software_deployed, run);

pub const EXECUTABLE_MODE: u32 = 0o755;
pub const DATA_MODE: u32 = 0o644;

#[derive(Debug, Default)]
pub struct PermissionReport {
    pub updated: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl PermissionReport {
    fn apply(&mut self, path: &Path, mode: u32) {
        let current = match fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => return,
            Ok(meta) => meta.permissions().mode() & 0o7777,
            Err(e) => {
                self.failures.push((path.to_path_buf(), e.to_string()));
                return;
            }
        };
        if current == mode {
            return;
        }
        match fs::set_permissions(path, Permissions::from_mode(mode)) {
            Ok(()) => self.updated += 1,
            Err(e) => self.failures.push((path.to_path_buf(), e.to_string())),
        }
    }
}

/// Directories and scripts get 0755; root-level configuration gets 0644.
pub fn normalize(ctx: &InstallationContext) -> PermissionReport {
    let mut report = PermissionReport::default();

    let trees = [
        ctx.software_dir(),
        ctx.web_dir(),
        ctx.photos_dir(),
        ctx.backup_photos_dir(),
        ctx.logs_dir(),
    ];
    for tree in trees {
        for entry in WalkDir::new(&tree) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(tree.as_path()).to_path_buf();
                    report.failures.push((path, e.to_string()));
                    continue;
                }
            };
            let file_type = entry.file_type();
            let is_script =
                file_type.is_file() && layout::has_extension(entry.path(), &SCRIPT_EXTENSIONS);
            if file_type.is_dir() || is_script {
                report.apply(entry.path(), EXECUTABLE_MODE);
            }
        }
    }
    report.apply(&ctx.dashboard_entry(), EXECUTABLE_MODE);

    if let Ok(entries) = fs::read_dir(&ctx.target_dir) {
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_file())
                && !layout::has_extension(&path, &SCRIPT_EXTENSIONS)
            {
                report.apply(&path, DATA_MODE);
            }
        }
    }
    report
}

fn run(env: &mut StepEnv<'_>) -> Result<(), InstallError> {
    let report = normalize(env.ctx);
    for (path, reason) in &report.failures {
        warn!("chmod {} failed: {reason}", path.display());
        env.log.info(format!("Could not set permissions on {}: {reason}", path.display()));
    }
    env.log.info(format!(
        "Permissions normalized ({} changed, {} skipped)",
        report.updated,
        report.failures.len()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::install::core::InstallLog;
    use crate::install::recording::RecordingBackend;
    use crate::install::test_support::{PayloadFixture, deployed};

    fn mode(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn scripts_are_executable_and_configuration_is_not() {
        let payload = PayloadFixture::complete();
        let ctx = deployed(&payload);
        let config = ctx.target_dir.join("camera_settings.csv");
        fs::set_permissions(&config, Permissions::from_mode(0o600)).unwrap();
        let script = ctx.software_dir().join("TakePhoto.py");
        fs::set_permissions(&script, Permissions::from_mode(0o600)).unwrap();

        let report = normalize(&ctx);

        assert!(report.failures.is_empty(), "{:?}", report.failures);
        assert_eq!(mode(&script), 0o755);
        assert_eq!(mode(&ctx.dashboard_entry()), 0o755);
        assert_eq!(mode(&config), 0o644);
        assert_eq!(mode(&ctx.photos_dir()), 0o755);
        assert_eq!(mode(&ctx.static_dir().join("css")), 0o755);
    }

    #[test]
    fn second_pass_changes_nothing() {
        let payload = PayloadFixture::complete();
        let ctx = deployed(&payload);
        normalize(&ctx);
        assert_eq!(normalize(&ctx).updated, 0);
    }

    #[test]
    fn unreadable_entries_are_logged_and_skipped() {
        let payload = PayloadFixture::complete();
        let ctx = deployed(&payload);
        fs::remove_file(ctx.dashboard_entry()).unwrap();
        let config = ctx.target_dir.join("controls.txt");
        fs::set_permissions(&config, Permissions::from_mode(0o600)).unwrap();
        let backend = RecordingBackend::new();
        let mut log = InstallLog::new(ctx.log_file.clone(), Box::new(io::sink()));

        STEP.run(&mut StepEnv {
            ctx: &ctx,
            backend: &backend,
            log: &mut log,
        })
        .unwrap();

        let app = ctx.dashboard_entry().display().to_string();
        let skipped = log
            .entries()
            .iter()
            .any(|e| e.message.contains("Could not set permissions") && e.message.contains(&app));
        assert!(skipped);
        assert_eq!(mode(&config), 0o644);
    }
}
