//! Installer configuration: flags, environment, TOML file and defaults
//!
//! Precedence per option is flag, then environment variable (both handled by
//! clap), then the `--config` file, then the built-in default.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use nix::unistd::{Uid, User};
use serde::Deserialize;

use crate::cli::Cli;
use crate::install::core::{
    DEFAULT_HOST_ALIAS, DEFAULT_SERVICE_PORT, InstallationContext, LegacyPathTable,
};

pub const PRODUCT_DIR: &str = "CreatureBox";
pub const RUNTIME_ENV_DIR: &str = "CreatureBox-env";
const FALLBACK_USER: &str = "pi";

/// Contents of the optional `--config` TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallConfig {
    pub target_dir: Option<PathBuf>,
    pub venv: Option<PathBuf>,
    /// `false` installs into the system interpreter.
    pub isolated_runtime: Option<bool>,
    pub port: Option<u16>,
    pub source: Option<PathBuf>,
    pub host_alias: Option<String>,
    pub user: Option<String>,
    /// Extra historical roots to rewrite, on top of the built-in ones.
    pub legacy_paths: Vec<String>,
}

impl InstallConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Facts about the invoking session that defaults derive from.
#[derive(Debug, Clone)]
pub struct HostDefaults {
    pub home: PathBuf,
    pub cwd: PathBuf,
    pub user: String,
}

impl HostDefaults {
    pub fn detect() -> Result<Self> {
        let home = dirs::home_dir().context("Cannot determine the home directory")?;
        let cwd = std::env::current_dir().context("Cannot determine the current directory")?;
        Ok(Self {
            home,
            cwd,
            user: invoking_user(),
        })
    }

    /// `~/...` expands against home; relative paths resolve against cwd.
    fn absolute(&self, path: &Path) -> PathBuf {
        if let Ok(rest) = path.strip_prefix("~") {
            return self.home.join(rest);
        }
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// The user who ran the installer, even under sudo.
fn invoking_user() -> String {
    if let Ok(user) = std::env::var("SUDO_USER")
        && !user.is_empty()
        && user != "root"
    {
        return user;
    }
    User::from_uid(Uid::current())
        .ok()
        .flatten()
        .map(|u| u.name)
        .unwrap_or_else(|| FALLBACK_USER.to_string())
}

/// A DNS label: letters, digits and inner hyphens, at most 63 bytes.
pub fn is_valid_alias(alias: &str) -> bool {
    !alias.is_empty()
        && alias.len() <= 63
        && !alias.starts_with('-')
        && !alias.ends_with('-')
        && alias.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Merge flags, config file and defaults into the context every step shares.
pub fn resolve_context(
    cli: &Cli,
    file: &InstallConfig,
    host: &HostDefaults,
) -> Result<InstallationContext> {
    let target_dir = cli
        .target_dir
        .as_deref()
        .or(file.target_dir.as_deref())
        .map(|p| host.absolute(p))
        .unwrap_or_else(|| host.home.join(PRODUCT_DIR));

    let runtime_env = if cli.no_venv {
        None
    } else if let Some(venv) = &cli.venv {
        Some(host.absolute(venv))
    } else if file.isolated_runtime == Some(false) {
        None
    } else {
        Some(
            file.venv
                .as_deref()
                .map(|p| host.absolute(p))
                .unwrap_or_else(|| host.home.join(RUNTIME_ENV_DIR)),
        )
    };

    let port = cli.port.or(file.port).unwrap_or(DEFAULT_SERVICE_PORT);
    if port == 0 {
        bail!("Service port must be between 1 and 65535");
    }

    let source = cli
        .source
        .as_deref()
        .or(file.source.as_deref())
        .map(|p| host.absolute(p))
        .unwrap_or_else(|| host.cwd.clone());

    let alias = cli
        .host_alias
        .clone()
        .or_else(|| file.host_alias.clone())
        .unwrap_or_else(|| DEFAULT_HOST_ALIAS.to_string());
    if !is_valid_alias(&alias) {
        bail!("Host alias `{alias}` is not a valid DNS label");
    }

    let user = cli
        .user
        .clone()
        .or_else(|| file.user.clone())
        .unwrap_or_else(|| host.user.clone());

    let mut legacy = LegacyPathTable::with_defaults();
    legacy.extend(&file.legacy_paths);

    Ok(InstallationContext::new(source, target_dir)
        .runtime_env(runtime_env)
        .port(port)
        .host_alias(alias)
        .user(user)
        .legacy_paths(legacy)
        .allow_unsupported_host(cli.allow_unsupported_host))
}
