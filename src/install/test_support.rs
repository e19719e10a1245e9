//! Payload trees for unit tests

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use super::core::InstallationContext;
use super::steps::deploy::PayloadGroup;
use super::steps::scaffold::create_skeleton;

const FILES: &[(&str, &str)] = &[
    (
        "src/software/TakePhoto.py",
        "#!/usr/bin/env python3\n\
         PHOTOS = '/home/pi/Desktop/Mothbox/photos'\n\
         SETTINGS = '/home/pi/Desktop/Mothbox/camera_settings.csv'\n",
    ),
    (
        "src/software/Scheduler.py",
        "#!/usr/bin/env python3\nSCHEDULE = '/home/pi/Mothbox/schedule_settings.csv'\n",
    ),
    ("src/software/Backup_Files.py", "DEST = '/home/pi/CreatureBox/photos_backedup'\n"),
    ("src/software/Attract_On.py", "print('lights on')\n"),
    ("src/software/Attract_Off.py", "print('lights off')\n"),
    (
        "src/software/scripts/rotate_logs.sh",
        "#!/bin/sh\nfind /home/pi/Desktop/Mothbox/logs -mtime +7 -delete\n",
    ),
    ("src/config/camera_settings.csv", "SETTING,VALUE\nExposureTime,500\n"),
    (
        "src/config/schedule_settings.csv",
        "SETTING,VALUE\nbackup_path,/home/pi/Desktop/Mothbox/photos_backedup\n",
    ),
    ("src/config/controls.txt", "shutdown_enabled=True\n"),
    (
        "src/web/app.py",
        "import os\n\
         BASE = '/home/pi/Desktop/CreatureBox'\n\
         PORT = int(os.environ.get('CREATUREBOX_PORT', 5000))\n",
    ),
    ("src/web/camera_helpers.py", "LOGS = '/home/pi/CreatureBox/logs'\n"),
    ("src/web/__pycache__/app.cpython-311.pyc", ""),
    ("src/web/static/css/style.css", "body { margin: 0; }\n"),
    ("src/web/static/js/dashboard.js", "console.log('ready');\n"),
    ("requirements.txt", "flask\n"),
    ("README.md", "# CreatureBox\n"),
];

/// A complete CreatureBox checkout plus an empty place to install it.
pub struct PayloadFixture {
    dir: TempDir,
}

impl PayloadFixture {
    pub fn complete() -> Self {
        let fixture = Self {
            dir: TempDir::new().expect("temp dir"),
        };
        for (relative, contents) in FILES {
            fixture.write(relative, contents);
        }
        fixture
    }

    pub fn source(&self) -> PathBuf {
        self.dir.path().join("checkout")
    }

    pub fn target(&self) -> PathBuf {
        self.dir.path().join("CreatureBox")
    }

    pub fn context(&self) -> InstallationContext {
        InstallationContext::new(self.source(), self.target())
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.source().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write payload file");
    }
}

/// Scaffold and deploy every required group, as the pipeline would.
pub fn deployed(payload: &PayloadFixture) -> InstallationContext {
    let ctx = payload.context();
    create_skeleton(&ctx).expect("scaffold");
    for group in PayloadGroup::ALL {
        group.deploy(&ctx).expect("deploy group");
    }
    ctx
}
