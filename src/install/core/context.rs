//! Installation context resolved once before the pipeline starts

use std::path::{Path, PathBuf};

use super::legacy::LegacyPathTable;
use crate::install::layout;

pub const DEFAULT_SERVICE_PORT: u16 = 5000;
pub const DEFAULT_HOST_ALIAS: &str = "creaturebox";
pub const SYSTEM_PYTHON: &str = "/usr/bin/python3";

/// Immutable installation settings shared by every step.
///
/// Built with the consuming setters below, then only ever passed by
/// reference.
#[derive(Debug, Clone)]
pub struct InstallationContext {
    pub target_dir: PathBuf,
    pub runtime_env_path: Option<PathBuf>,
    pub service_port: u16,
    pub source_root: PathBuf,
    pub log_file: PathBuf,
    pub host_alias: String,
    pub service_user: String,
    pub legacy_paths: LegacyPathTable,
    pub allow_unsupported_host: bool,
}

impl InstallationContext {
    pub fn new(source_root: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        let target_dir = target_dir.into();
        let log_file = target_dir.join(layout::LOGS_DIR).join(layout::INSTALL_LOG);
        Self {
            target_dir,
            runtime_env_path: None,
            service_port: DEFAULT_SERVICE_PORT,
            source_root: source_root.into(),
            log_file,
            host_alias: DEFAULT_HOST_ALIAS.to_string(),
            service_user: "pi".to_string(),
            legacy_paths: LegacyPathTable::with_defaults(),
            allow_unsupported_host: false,
        }
    }

    pub fn runtime_env(mut self, path: Option<PathBuf>) -> Self {
        self.runtime_env_path = path;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.service_port = port;
        self
    }

    pub fn host_alias(mut self, alias: impl Into<String>) -> Self {
        self.host_alias = alias.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.service_user = user.into();
        self
    }

    pub fn legacy_paths(mut self, table: LegacyPathTable) -> Self {
        self.legacy_paths = table;
        self
    }

    pub fn allow_unsupported_host(mut self, allow: bool) -> Self {
        self.allow_unsupported_host = allow;
        self
    }

    // Source tree

    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.source_root.join(relative)
    }

    // Target tree

    pub fn software_dir(&self) -> PathBuf {
        self.target_dir.join(layout::SOFTWARE_DIR)
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.target_dir.join(layout::PHOTOS_DIR)
    }

    pub fn backup_photos_dir(&self) -> PathBuf {
        self.target_dir.join(layout::BACKUP_PHOTOS_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.target_dir.join(layout::LOGS_DIR)
    }

    pub fn web_dir(&self) -> PathBuf {
        self.target_dir.join(layout::WEB_DIR)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.web_dir().join(layout::STATIC_DIR)
    }

    pub fn dashboard_entry(&self) -> PathBuf {
        self.web_dir().join(layout::DASHBOARD_ENTRY)
    }

    pub fn crontab_example(&self) -> PathBuf {
        self.target_dir.join(layout::CRONTAB_EXAMPLE)
    }

    /// mDNS name the dashboard is published under.
    pub fn host_name(&self) -> String {
        format!("{}.local", self.host_alias)
    }

    /// Interpreter that runs the payload scripts and the dashboard.
    pub fn interpreter(&self) -> PathBuf {
        match &self.runtime_env_path {
            Some(env) => env.join("bin").join("python3"),
            None => which::which("python3").unwrap_or_else(|_| PathBuf::from(SYSTEM_PYTHON)),
        }
    }

    pub fn target_str(&self) -> String {
        self.target_dir.to_string_lossy().into_owned()
    }

    pub fn is_inside_target(&self, path: &Path) -> bool {
        path.starts_with(&self.target_dir)
    }
}
