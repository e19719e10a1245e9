//! Backend that records host operations instead of performing them
//!
//! Used for `--dry-run` and as the test double for every step that talks to
//! the host.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::backend::{EXPECTED_HARDWARE, ProvisioningBackend, SystemPaths, read_host_model};
use super::core::InstallError;
use super::services::{self, DescriptorKind, RenderedDescriptor};

/// One host operation the pipeline asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendAction {
    RefreshPackageIndex,
    EnsurePackages(Vec<String>),
    EnsureRuntimeEnv(PathBuf),
    InstallRequirements {
        interpreter: PathBuf,
        manifest: PathBuf,
    },
    ProbeI2c {
        bus: u8,
        address: u8,
    },
    InstallDescriptor {
        kind: DescriptorKind,
        path: PathBuf,
    },
    AppendHostsEntry {
        ip: String,
        host_name: String,
    },
}

impl fmt::Display for BackendAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RefreshPackageIndex => f.write_str("refresh package index"),
            Self::EnsurePackages(packages) => write!(f, "install packages: {}", packages.join(" ")),
            Self::EnsureRuntimeEnv(path) => {
                write!(f, "create isolated environment {}", path.display())
            }
            Self::InstallRequirements {
                interpreter,
                manifest,
            } => write!(
                f,
                "install {} with {}",
                manifest.display(),
                interpreter.display()
            ),
            Self::ProbeI2c { bus, address } => write!(f, "probe I2C bus {bus} at {address:#04x}"),
            Self::InstallDescriptor { kind, path } => {
                write!(f, "install {kind} {} and activate it", path.display())
            }
            Self::AppendHostsEntry { ip, host_name } => {
                write!(f, "append `{ip} {host_name}` to the hosts file")
            }
        }
    }
}

/// Operation a [`RecordingBackend`] should refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    PackageIndex,
    RuntimeEnv,
    Requirements,
    I2cProbe,
    Descriptor(DescriptorKind),
    HostsEntry,
}

#[derive(Debug)]
pub struct RecordingBackend {
    host_model: Option<String>,
    i2c_devices: Vec<(u8, u8)>,
    failure: Option<FailurePoint>,
    failing_packages: Vec<String>,
    paths: SystemPaths,
    hosts: RefCell<String>,
    actions: RefCell<Vec<BackendAction>>,
    descriptors: RefCell<BTreeMap<DescriptorKind, RenderedDescriptor>>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// A healthy Raspberry Pi with no accessories and a localhost-only hosts file.
    pub fn new() -> Self {
        Self {
            host_model: Some(format!("{EXPECTED_HARDWARE} 4 Model B Rev 1.4")),
            i2c_devices: Vec::new(),
            failure: None,
            failing_packages: Vec::new(),
            paths: SystemPaths::default(),
            hosts: RefCell::new("127.0.0.1\tlocalhost\n".to_string()),
            actions: RefCell::new(Vec::new()),
            descriptors: RefCell::new(BTreeMap::new()),
        }
    }

    /// Mirror the real host's model and hosts file without changing either.
    pub fn dry_run(paths: SystemPaths) -> Self {
        let host_model = read_host_model(&paths.device_model);
        let hosts = fs::read_to_string(&paths.hosts_file).unwrap_or_default();
        Self {
            host_model,
            paths,
            hosts: RefCell::new(hosts),
            ..Self::new()
        }
    }

    pub fn with_host_model(mut self, model: Option<&str>) -> Self {
        self.host_model = model.map(str::to_string);
        self
    }

    pub fn with_i2c_device(mut self, bus: u8, address: u8) -> Self {
        self.i2c_devices.push((bus, address));
        self
    }

    pub fn with_hosts(self, content: &str) -> Self {
        self.hosts.replace(content.to_string());
        self
    }

    pub fn failing_at(mut self, point: FailurePoint) -> Self {
        self.failure = Some(point);
        self
    }

    /// Refuse any `ensure_packages` call that includes `package`.
    pub fn failing_package(mut self, package: &str) -> Self {
        self.failing_packages.push(package.to_string());
        self
    }

    pub fn actions(&self) -> Vec<BackendAction> {
        self.actions.borrow().clone()
    }

    pub fn descriptor(&self, kind: DescriptorKind) -> Option<RenderedDescriptor> {
        self.descriptors.borrow().get(&kind).cloned()
    }

    pub fn hosts_content(&self) -> String {
        self.hosts.borrow().clone()
    }

    fn record(&self, action: BackendAction) {
        debug!("Recorded: {action}");
        self.actions.borrow_mut().push(action);
    }

    fn fails_at(&self, point: FailurePoint) -> bool {
        self.failure == Some(point)
    }

    fn install(&self, descriptor: &RenderedDescriptor) -> Result<PathBuf, InstallError> {
        if self.fails_at(FailurePoint::Descriptor(descriptor.kind)) {
            return Err(InstallError::service(
                descriptor.kind,
                format!("{}: activation refused", descriptor.file_name),
            ));
        }
        let path = self.paths.descriptor_path(descriptor);
        self.record(BackendAction::InstallDescriptor {
            kind: descriptor.kind,
            path: path.clone(),
        });
        self.descriptors
            .borrow_mut()
            .insert(descriptor.kind, descriptor.clone());
        Ok(path)
    }
}

impl ProvisioningBackend for RecordingBackend {
    fn host_model(&self) -> Option<String> {
        self.host_model.clone()
    }

    fn refresh_package_index(&self) -> Result<(), InstallError> {
        if self.fails_at(FailurePoint::PackageIndex) {
            return Err(InstallError::dependency(
                "package index",
                "temporary failure resolving archive host",
            ));
        }
        self.record(BackendAction::RefreshPackageIndex);
        Ok(())
    }

    fn ensure_packages(&self, packages: &[&str]) -> Result<(), InstallError> {
        if let Some(bad) = packages
            .iter()
            .find(|p| self.failing_packages.iter().any(|f| f.as_str() == **p))
        {
            return Err(InstallError::dependency(
                *bad,
                format!("unable to locate package {bad}"),
            ));
        }
        self.record(BackendAction::EnsurePackages(
            packages.iter().map(|p| p.to_string()).collect(),
        ));
        Ok(())
    }

    fn ensure_runtime_env(&self, env_path: &Path) -> Result<(), InstallError> {
        if self.fails_at(FailurePoint::RuntimeEnv) {
            return Err(InstallError::dependency(
                "isolated environment",
                "ensurepip is not available",
            ));
        }
        self.record(BackendAction::EnsureRuntimeEnv(env_path.to_path_buf()));
        Ok(())
    }

    fn install_requirements(
        &self,
        interpreter: &Path,
        manifest: &Path,
    ) -> Result<(), InstallError> {
        if self.fails_at(FailurePoint::Requirements) {
            return Err(InstallError::dependency(
                manifest.display().to_string(),
                "no matching distribution found",
            ));
        }
        self.record(BackendAction::InstallRequirements {
            interpreter: interpreter.to_path_buf(),
            manifest: manifest.to_path_buf(),
        });
        Ok(())
    }

    fn probe_i2c_device(&self, bus: u8, address: u8) -> Result<bool, InstallError> {
        if self.fails_at(FailurePoint::I2cProbe) {
            return Err(InstallError::dependency(
                "i2c-tools",
                format!("cannot open /dev/i2c-{bus}"),
            ));
        }
        self.record(BackendAction::ProbeI2c { bus, address });
        Ok(self.i2c_devices.contains(&(bus, address)))
    }

    fn install_and_activate_unit(
        &self,
        unit: &RenderedDescriptor,
    ) -> Result<PathBuf, InstallError> {
        self.install(unit)
    }

    fn install_and_reload_site(&self, site: &RenderedDescriptor) -> Result<PathBuf, InstallError> {
        self.install(site)
    }

    fn install_and_restart_discovery(
        &self,
        service: &RenderedDescriptor,
    ) -> Result<PathBuf, InstallError> {
        self.install(service)
    }

    fn ensure_hosts_entry(&self, ip: &str, host_name: &str) -> Result<bool, InstallError> {
        if self.fails_at(FailurePoint::HostsEntry) {
            return Err(InstallError::service(
                "hosts file",
                format!("cannot append to {}", self.paths.hosts_file.display()),
            ));
        }
        if services::has_entry(&self.hosts.borrow(), ip, host_name) {
            return Ok(false);
        }
        let suffix = services::entry_suffix(&self.hosts.borrow(), ip, host_name);
        self.hosts.borrow_mut().push_str(&suffix);
        self.record(BackendAction::AppendHostsEntry {
            ip: ip.to_string(),
            host_name: host_name.to_string(),
        });
        Ok(true)
    }
}
