//! Host capabilities the pipeline needs from the operating system
//!
//! Steps never spawn package managers or service managers themselves; they
//! go through this trait so the pipeline can run against
//! [`RecordingBackend`](super::recording::RecordingBackend) in tests and
//! dry runs, and against [`SystemBackend`](super::linux::SystemBackend) on a
//! real host.

use std::fs;
use std::path::{Path, PathBuf};

use super::core::InstallError;
use super::services::{DescriptorKind, RenderedDescriptor};

/// Marker every Raspberry Pi model string contains.
pub const EXPECTED_HARDWARE: &str = "Raspberry Pi";

/// Where descriptors and host facts live on the target system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPaths {
    pub unit_dir: PathBuf,
    pub sites_available: PathBuf,
    pub sites_enabled: PathBuf,
    pub avahi_services: PathBuf,
    pub hosts_file: PathBuf,
    pub device_model: PathBuf,
}

impl Default for SystemPaths {
    fn default() -> Self {
        Self {
            unit_dir: PathBuf::from("/etc/systemd/system"),
            sites_available: PathBuf::from("/etc/nginx/sites-available"),
            sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
            avahi_services: PathBuf::from("/etc/avahi/services"),
            hosts_file: PathBuf::from("/etc/hosts"),
            device_model: PathBuf::from("/proc/device-tree/model"),
        }
    }
}

impl SystemPaths {
    /// Final location of an installed descriptor.
    pub fn descriptor_path(&self, descriptor: &RenderedDescriptor) -> PathBuf {
        let dir = match descriptor.kind {
            DescriptorKind::SupervisorUnit => &self.unit_dir,
            DescriptorKind::ReverseProxyVhost => &self.sites_available,
            DescriptorKind::DiscoveryAdvertisement => &self.avahi_services,
        };
        dir.join(&descriptor.file_name)
    }
}

/// Read the device-tree model string, dropping the trailing NUL.
pub fn read_host_model(path: &Path) -> Option<String> {
    let raw = fs::read(path).ok()?;
    let model = String::from_utf8_lossy(&raw)
        .trim_end_matches('\0')
        .trim()
        .to_string();
    (!model.is_empty()).then_some(model)
}

pub trait ProvisioningBackend {
    /// Hardware model reported by the host, if it reports one.
    fn host_model(&self) -> Option<String>;

    /// Bring the package index up to date.
    fn refresh_package_index(&self) -> Result<(), InstallError>;

    /// Install `packages`; already-installed packages are a no-op.
    fn ensure_packages(&self, packages: &[&str]) -> Result<(), InstallError>;

    /// Create the isolated runtime environment at `env_path` if missing.
    fn ensure_runtime_env(&self, env_path: &Path) -> Result<(), InstallError>;

    /// Install the runtime dependency manifest with `interpreter`.
    fn install_requirements(&self, interpreter: &Path, manifest: &Path)
    -> Result<(), InstallError>;

    /// Whether a device answers at `address` on I2C `bus`.
    fn probe_i2c_device(&self, bus: u8, address: u8) -> Result<bool, InstallError>;

    /// Install a supervisor unit, reload the unit index, enable it at boot
    /// and (re)start it.
    fn install_and_activate_unit(&self, unit: &RenderedDescriptor)
    -> Result<PathBuf, InstallError>;

    /// Install a reverse-proxy site, link it into the enabled set and reload
    /// the proxy.
    fn install_and_reload_site(&self, site: &RenderedDescriptor) -> Result<PathBuf, InstallError>;

    /// Install a discovery advertisement and restart the discovery daemon.
    fn install_and_restart_discovery(
        &self,
        service: &RenderedDescriptor,
    ) -> Result<PathBuf, InstallError>;

    /// Append `ip host_name` to the name-resolution file unless already
    /// mapped. Returns whether a line was appended.
    fn ensure_hosts_entry(&self, ip: &str, host_name: &str) -> Result<bool, InstallError>;
}
