//! System packages, isolated runtime and runtime requirements

use log::{debug, warn};

use crate::install::backend::{EXPECTED_HARDWARE, ProvisioningBackend};
use crate::install::core::{InstallError, InstallLog, InstallationContext, Step, StepEnv, always};
use crate::install::layout;

pub const STEP: Step = Step::new("provision dependencies", true, always, run);

/// Packages the payload, dashboard and host services need.
pub const SYSTEM_PACKAGES: [&str; 10] = [
    "git",
    "python3",
    "python3-pip",
    "python3-venv",
    "python3-picamera2",
    "libcamera-apps",
    "i2c-tools",
    "nginx",
    "avahi-daemon",
    "systemd",
];

/// Optional accessory detected on the I2C bus before its driver is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accessory {
    pub name: &'static str,
    pub bus: u8,
    pub address: u8,
    pub package: &'static str,
}

pub const BATTERY_HAT: Accessory = Accessory {
    name: "PiJuice battery HAT",
    bus: 1,
    address: 0x14,
    package: "pijuice-base",
};

fn run(env: &mut StepEnv<'_>) -> Result<(), InstallError> {
    check_hardware(env.ctx, env.backend, env.log)?;

    env.log.info("Updating package index");
    env.backend.refresh_package_index()?;
    env.log.info(format!("Installing system packages: {}", SYSTEM_PACKAGES.join(" ")));
    env.backend.ensure_packages(&SYSTEM_PACKAGES)?;

    if let Some(env_path) = &env.ctx.runtime_env_path {
        env.log.info(format!("Preparing isolated environment at {}", env_path.display()));
        env.backend.ensure_runtime_env(env_path)?;
    }

    let manifest = env.ctx.source_path(layout::REQUIREMENTS_MANIFEST);
    if manifest.is_file() {
        let interpreter = env.ctx.interpreter();
        env.log.info(format!(
            "Installing runtime requirements from {} with {}",
            manifest.display(),
            interpreter.display()
        ));
        env.backend.install_requirements(&interpreter, &manifest)?;
    } else {
        debug!("No runtime manifest at {}", manifest.display());
    }

    install_accessory(&BATTERY_HAT, env.backend, env.log);
    Ok(())
}

/// Refuse non-Pi hosts unless the operator accepted the risk.
pub fn check_hardware(
    ctx: &InstallationContext,
    backend: &dyn ProvisioningBackend,
    log: &mut InstallLog,
) -> Result<(), InstallError> {
    let model = backend.host_model();
    if model.as_deref().is_some_and(|m| m.contains(EXPECTED_HARDWARE)) {
        log.info(format!("Detected {}", model.unwrap_or_default()));
        return Ok(());
    }

    let model = model.unwrap_or_else(|| "unknown hardware".to_string());
    if ctx.allow_unsupported_host {
        log.info(format!("Host `{model}` is not a {EXPECTED_HARDWARE}; continuing as requested"));
        Ok(())
    } else {
        Err(InstallError::EnvironmentMismatch { model })
    }
}

/// Install `accessory`'s driver when the device answers. Never fails.
pub fn install_accessory(
    accessory: &Accessory,
    backend: &dyn ProvisioningBackend,
    log: &mut InstallLog,
) -> bool {
    match backend.probe_i2c_device(accessory.bus, accessory.address) {
        Ok(true) => {}
        Ok(false) => {
            log.info(format!("No {} detected", accessory.name));
            return false;
        }
        Err(e) => {
            warn!("I2C probe for {} failed: {e}", accessory.name);
            log.info(format!("Could not probe for {}; skipping its driver", accessory.name));
            return false;
        }
    }

    log.info(format!("{} detected; installing {}", accessory.name, accessory.package));
    match backend.ensure_packages(&[accessory.package]) {
        Ok(()) => true,
        Err(e) => {
            warn!("{} driver install failed: {e}", accessory.name);
            log.info(format!(
                "Could not install {} ({e}); the capture schedule still works without it",
                accessory.package
            ));
            false
        }
    }
}
