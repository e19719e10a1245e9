//! Rewrites legacy installation roots inside deployed files
//!
//! Each changed file is replaced atomically, so an interrupted run leaves
//! every file either fully migrated or untouched.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use super::software_deployed;
use crate::install::core::{
    InstallError, InstallationContext, PathRewrite, Step, StepEnv, rewrite_content,
};
use crate::install::file_ops::write_file_atomic;
use crate::install::layout::{self, TEXT_EXTENSIONS};

pub const STEP: Step = Step::new("migrate legacy paths", true, software_deployed, run);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub scanned: usize,
    pub rewritten: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

fn is_text_file(path: &Path) -> bool {
    layout::has_extension(path, &TEXT_EXTENSIONS)
}

/// Deployed scripts, dashboard sources and root-level configuration.
pub fn candidates(ctx: &InstallationContext) -> Vec<PathBuf> {
    let static_dir = ctx.static_dir();
    let mut files = Vec::new();
    for root in [ctx.software_dir(), ctx.web_dir()] {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.path() != static_dir.as_path());
        files.extend(
            walker
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file() && is_text_file(entry.path()))
                .map(|entry| entry.into_path()),
        );
    }

    if let Ok(entries) = fs::read_dir(&ctx.target_dir) {
        let mut root_files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .filter(|path| is_text_file(path))
            .collect();
        root_files.sort();
        files.extend(root_files);
    }
    files
}

/// Rewrite one file. `Some(false)` when nothing matched, `None` when the
/// file is not UTF-8 text.
pub fn migrate_file(path: &Path, rewrites: &[PathRewrite]) -> Result<Option<bool>, InstallError> {
    let bytes = fs::read(path).map_err(|e| InstallError::io("read", path, e))?;
    let Ok(content) = String::from_utf8(bytes) else {
        return Ok(None);
    };
    match rewrite_content(&content, rewrites) {
        Some(updated) => {
            write_file_atomic(path, updated.as_bytes(), None)?;
            Ok(Some(true))
        }
        None => Ok(Some(false)),
    }
}

pub fn migrate(ctx: &InstallationContext) -> Result<MigrationReport, InstallError> {
    let rewrites = ctx.legacy_paths.rewrites_to(&ctx.target_str());
    let mut report = MigrationReport::default();

    for path in candidates(ctx) {
        report.scanned += 1;
        match migrate_file(&path, &rewrites)? {
            Some(true) => {
                debug!("Migrated {}", path.display());
                report.rewritten.push(path);
            }
            Some(false) => {}
            None => {
                warn!("Skipping non-UTF-8 file {}", path.display());
                report.skipped.push(path);
            }
        }
    }
    Ok(report)
}

fn run(env: &mut StepEnv<'_>) -> Result<(), InstallError> {
    let report = migrate(env.ctx)?;
    env.log.info(format!(
        "Scanned {} files, rewrote legacy paths in {}",
        report.scanned,
        report.rewritten.len()
    ));
    for path in &report.rewritten {
        if let Ok(relative) = path.strip_prefix(&env.ctx.target_dir) {
            env.log.info(format!("  updated {}", relative.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::install::core::LegacyPathTable;
    use crate::install::test_support::{PayloadFixture, deployed};

    #[test]
    fn rewrites_scripts_dashboard_and_configuration() {
        let payload = PayloadFixture::complete();
        let ctx = deployed(&payload);

        let report = migrate(&ctx).unwrap();

        let target = ctx.target_str();
        let script = fs::read_to_string(ctx.software_dir().join("TakePhoto.py")).unwrap();
        assert!(script.contains(&format!("{target}/photos")));
        assert!(!script.contains("/home/pi/Desktop/Mothbox"));
        let schedule = fs::read_to_string(ctx.target_dir.join("schedule_settings.csv")).unwrap();
        assert!(schedule.contains(&format!("{target}/photos_backedup")));
        assert!(report.rewritten.contains(&ctx.dashboard_entry()));
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let payload = PayloadFixture::complete();
        let ctx = deployed(&payload);

        migrate(&ctx).unwrap();
        let report = migrate(&ctx).unwrap();

        assert!(report.rewritten.is_empty());
        assert!(report.scanned > 0);
    }

    #[test]
    fn extra_roots_from_configuration_are_applied() {
        let payload = PayloadFixture::complete();
        payload.write("src/software/Attract_On.py", "LOG = '/srv/creatures/logs'\n");
        let mut table = LegacyPathTable::with_defaults();
        table.insert("/srv/creatures");
        let ctx = deployed(&payload).legacy_paths(table);

        migrate(&ctx).unwrap();

        let script = fs::read_to_string(ctx.software_dir().join("Attract_On.py")).unwrap();
        assert_eq!(script, format!("LOG = '{}/logs'\n", ctx.target_str()));
    }

    #[test]
    fn binary_files_are_left_alone() {
        let payload = PayloadFixture::complete();
        let ctx = deployed(&payload);
        let blob = ctx.software_dir().join("calibration.txt");
        let mut file = fs::File::create(&blob).unwrap();
        file.write_all(b"/home/pi/Mothbox\xff\xfe").unwrap();

        let report = migrate(&ctx).unwrap();

        assert_eq!(report.skipped, vec![blob.clone()]);
        assert_eq!(fs::read(&blob).unwrap(), b"/home/pi/Mothbox\xff\xfe");
    }

    #[test]
    fn static_assets_are_not_scanned() {
        let payload = PayloadFixture::complete();
        let ctx = deployed(&payload);
        assert!(
            candidates(&ctx)
                .iter()
                .all(|p| !p.starts_with(ctx.static_dir()))
        );
    }

    #[test]
    fn write_failure_stops_the_remaining_files() {
        // Directory modes do not bind root.
        if nix::unistd::geteuid().is_root() {
            return;
        }
        let payload = PayloadFixture::complete();
        let ctx = deployed(&payload);
        let software = ctx.software_dir();
        fs::set_permissions(&software, fs::Permissions::from_mode(0o555)).unwrap();

        let result = migrate(&ctx);
        fs::set_permissions(&software, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(result.unwrap_err().kind(), "IOError");
        let script = fs::read_to_string(software.join("Backup_Files.py")).unwrap();
        assert!(script.contains("/home/pi/CreatureBox/photos_backedup"));
        let dashboard = fs::read_to_string(ctx.dashboard_entry()).unwrap();
        assert!(dashboard.contains("/home/pi/Desktop/CreatureBox"));
    }
}
