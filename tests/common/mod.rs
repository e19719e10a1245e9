//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::TempDir;
use walkdir::WalkDir;

pub const PAYLOAD: &[(&str, &str)] = &[
    (
        "src/software/TakePhoto.py",
        "#!/usr/bin/env python3\nPHOTOS = '/home/pi/Desktop/Mothbox/photos'\n",
    ),
    (
        "src/software/Scheduler.py",
        "#!/usr/bin/env python3\nSETTINGS = '/home/pi/Desktop/Mothbox/schedule_settings.csv'\n",
    ),
    ("src/software/Backup_Files.py", "SRC = '/home/pi/CreatureBox/photos'\n"),
    ("src/software/Attract_On.py", "print('on')\n"),
    ("src/software/Attract_Off.py", "print('off')\n"),
    ("src/config/camera_settings.csv", "SETTING,VALUE\nGain,2\n"),
    (
        "src/config/schedule_settings.csv",
        "SETTING,VALUE\nphotos,/home/pi/Mothbox/photos\n",
    ),
    ("src/config/controls.txt", "shutdown_enabled=True\n"),
    (
        "src/web/app.py",
        "BASE = '/home/pi/Desktop/CreatureBox'\n",
    ),
    ("src/web/static/css/style.css", "body {}\n"),
    ("src/web/static/images/logo.svg", "<svg/>\n"),
    ("requirements.txt", "flask\n"),
    ("LICENSE", "MIT\n"),
];

/// A CreatureBox checkout and an install root, both in one temp dir.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            dir: TempDir::new().unwrap(),
        };
        for (relative, contents) in PAYLOAD {
            workspace.write(relative, contents);
        }
        workspace
    }

    pub fn source(&self) -> PathBuf {
        self.dir.path().join("creaturebox")
    }

    pub fn target(&self) -> PathBuf {
        self.dir.path().join("install")
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.source().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.source().join(relative)).unwrap();
    }
}

/// Digest of every regular file under `root`, keyed by relative path.
pub fn tree_hash(root: &Path) -> String {
    let mut hasher = Sha256::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.unwrap();
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap();
        if relative.starts_with("logs") {
            continue;
        }
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update(fs::read(entry.path()).unwrap());
    }
    hex::encode(hasher.finalize())
}
