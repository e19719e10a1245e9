//! File-tree contract between the installer and the CreatureBox payload.
//!
//! Source paths are relative to the repository checkout; target names are
//! relative to the installation root.

// Source tree
pub const SOURCE_SOFTWARE_DIR: &str = "src/software";
pub const SOURCE_CONFIG_DIR: &str = "src/config";
pub const SOURCE_WEB_DIR: &str = "src/web";
pub const SOURCE_STATIC_DIR: &str = "src/web/static";
pub const REQUIREMENTS_MANIFEST: &str = "requirements.txt";
pub const OPTIONAL_DOCS: [&str; 2] = ["README.md", "LICENSE"];

// Payload file names
pub const CAPTURE_SCRIPT: &str = "TakePhoto.py";
pub const SCHEDULER_SCRIPT: &str = "Scheduler.py";
pub const BACKUP_SCRIPT: &str = "Backup_Files.py";
pub const CAMERA_SETTINGS: &str = "camera_settings.csv";
pub const SCHEDULE_SETTINGS: &str = "schedule_settings.csv";
pub const CONTROL_FLAGS: &str = "controls.txt";
pub const DASHBOARD_ENTRY: &str = "app.py";

/// Entry points linked into the installation root, in link order.
pub const ENTRY_POINT_LINKS: [&str; 5] = [
    CAPTURE_SCRIPT,
    SCHEDULER_SCRIPT,
    BACKUP_SCRIPT,
    "Attract_On.py",
    "Attract_Off.py",
];

// Target tree
pub const SOFTWARE_DIR: &str = "software";
pub const PHOTOS_DIR: &str = "photos";
pub const BACKUP_PHOTOS_DIR: &str = "photos_backedup";
pub const LOGS_DIR: &str = "logs";
pub const WEB_DIR: &str = "web";
pub const STATIC_DIR: &str = "static";
pub const STATIC_SUBDIRS: [&str; 3] = ["css", "js", "images"];
pub const INSTALL_LOG: &str = "install.log";
pub const CRONTAB_EXAMPLE: &str = "crontab.example";

/// Extensions treated as executable scripts.
pub const SCRIPT_EXTENSIONS: [&str; 2] = ["py", "sh"];

/// Extensions whose contents may carry absolute installation paths.
pub const TEXT_EXTENSIONS: [&str; 9] = [
    "py", "sh", "txt", "csv", "json", "toml", "cfg", "conf", "ini",
];

/// Build and cache artifacts never copied out of the source tree.
pub const SKIPPED_ARTIFACTS: [&str; 3] = ["__pycache__", ".git", ".DS_Store"];

pub(crate) fn has_extension(path: &std::path::Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}
