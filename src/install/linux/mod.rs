//! Provisioning backend for a real Debian-family host
//!
//! - `privileges` - root detection and `sudo` escalation
//! - `packages` - apt, isolated environment, pip, I2C probing
//! - `service_control` - systemctl and nginx invocations
//! - `file_ops` - writes into root-owned configuration directories

mod file_ops;
mod packages;
mod privileges;
mod service_control;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::backend::{ProvisioningBackend, SystemPaths, read_host_model};
use super::core::InstallError;
use super::services::{self, RenderedDescriptor};

const DESCRIPTOR_MODE: u32 = 0o644;
const PROXY_SERVICE: &str = "nginx";
const DISCOVERY_SERVICE: &str = "avahi-daemon";
const DEFAULT_SITE: &str = "default";

#[derive(Debug, Clone, Default)]
pub struct SystemBackend {
    paths: SystemPaths,
}

impl SystemBackend {
    pub fn new(paths: SystemPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &SystemPaths {
        &self.paths
    }

    fn install_descriptor(&self, descriptor: &RenderedDescriptor) -> Result<PathBuf, InstallError> {
        privileges::check_privileges()?;
        let path = self.paths.descriptor_path(descriptor);
        file_ops::install_file(&path, &descriptor.contents, DESCRIPTOR_MODE)
            .map_err(|reason| InstallError::service(descriptor.kind, reason))?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

impl ProvisioningBackend for SystemBackend {
    fn host_model(&self) -> Option<String> {
        read_host_model(&self.paths.device_model)
    }

    fn refresh_package_index(&self) -> Result<(), InstallError> {
        privileges::check_privileges()?;
        packages::update_index()
    }

    fn ensure_packages(&self, packages: &[&str]) -> Result<(), InstallError> {
        privileges::check_privileges()?;
        packages::install(packages)
    }

    fn ensure_runtime_env(&self, env_path: &Path) -> Result<(), InstallError> {
        packages::create_venv(env_path)
    }

    fn install_requirements(
        &self,
        interpreter: &Path,
        manifest: &Path,
    ) -> Result<(), InstallError> {
        packages::pip_install(interpreter, manifest)
    }

    fn probe_i2c_device(&self, bus: u8, address: u8) -> Result<bool, InstallError> {
        if which::which("i2cdetect").is_err() {
            return Ok(false);
        }
        packages::i2c_probe(bus, address)
    }

    fn install_and_activate_unit(
        &self,
        unit: &RenderedDescriptor,
    ) -> Result<PathBuf, InstallError> {
        let path = self.install_descriptor(unit)?;
        let name = unit.file_name.as_str();
        service_control::reload_systemd_daemon()
            .and_then(|()| service_control::enable_service(name))
            .and_then(|()| service_control::restart_service(name))
            .map_err(|reason| InstallError::service(unit.kind, reason))?;
        info!("Started {name}");
        Ok(path)
    }

    fn install_and_reload_site(&self, site: &RenderedDescriptor) -> Result<PathBuf, InstallError> {
        let path = self.install_descriptor(site)?;
        let fail = |reason: String| InstallError::service(site.kind, reason);

        let enabled = self.paths.sites_enabled.join(&site.file_name);
        file_ops::link(&path, &enabled).map_err(fail)?;

        // The stock site also claims default_server on port 80.
        let stock = self.paths.sites_enabled.join(DEFAULT_SITE);
        if fs::symlink_metadata(&stock).is_ok() {
            file_ops::remove(&stock).map_err(fail)?;
            info!("Disabled the stock nginx site");
        }

        service_control::test_nginx_config()
            .and_then(|()| service_control::enable_service(PROXY_SERVICE))
            .and_then(|()| service_control::reload_or_restart_service(PROXY_SERVICE))
            .map_err(fail)?;
        Ok(path)
    }

    fn install_and_restart_discovery(
        &self,
        service: &RenderedDescriptor,
    ) -> Result<PathBuf, InstallError> {
        let path = self.install_descriptor(service)?;
        service_control::restart_service(DISCOVERY_SERVICE)
            .map_err(|reason| InstallError::service(service.kind, reason))?;
        Ok(path)
    }

    fn ensure_hosts_entry(&self, ip: &str, host_name: &str) -> Result<bool, InstallError> {
        let hosts = &self.paths.hosts_file;
        let content = fs::read_to_string(hosts).map_err(|e| {
            InstallError::service("hosts file", format!("failed to read {}: {e}", hosts.display()))
        })?;
        if services::has_entry(&content, ip, host_name) {
            return Ok(false);
        }
        let suffix = services::entry_suffix(&content, ip, host_name);
        file_ops::append(hosts, &suffix)
            .map_err(|reason| InstallError::service("hosts file", reason))?;
        Ok(true)
    }
}
