//! apt, venv, pip and i2cdetect

use std::path::Path;
use std::process::Command;

use log::debug;

use super::privileges::privileged;
use super::service_control::run;
use crate::install::core::InstallError;

fn apt_get(args: &[&str]) -> Command {
    // sudo drops the caller's environment, so pass the frontend through env(1).
    let mut cmd = privileged("env");
    cmd.args(["DEBIAN_FRONTEND=noninteractive", "apt-get"]).args(args);
    cmd
}

pub(super) fn update_index() -> Result<(), InstallError> {
    run(&mut apt_get(&["update"]))
        .map(|_| ())
        .map_err(|reason| InstallError::dependency("package index", reason))
}

pub(super) fn install(packages: &[&str]) -> Result<(), InstallError> {
    let mut args = vec!["install", "-y"];
    args.extend_from_slice(packages);
    run(&mut apt_get(&args))
        .map(|_| ())
        .map_err(|reason| InstallError::dependency(packages.join(" "), reason))
}

pub(super) fn create_venv(env_path: &Path) -> Result<(), InstallError> {
    if env_path.join("bin").join("python3").exists() {
        debug!("Reusing isolated environment at {}", env_path.display());
        return Ok(());
    }
    let python = which::which("python3")
        .map_err(|e| InstallError::dependency("python3", e.to_string()))?;
    run(Command::new(python)
        .args(["-m", "venv", "--system-site-packages"])
        .arg(env_path))
    .map(|_| ())
    .map_err(|reason| {
        InstallError::dependency(format!("isolated environment {}", env_path.display()), reason)
    })
}

pub(super) fn pip_install(interpreter: &Path, manifest: &Path) -> Result<(), InstallError> {
    run(Command::new(interpreter)
        .args(["-m", "pip", "install", "--upgrade", "-r"])
        .arg(manifest))
    .map(|_| ())
    .map_err(|reason| InstallError::dependency(manifest.display().to_string(), reason))
}

pub(super) fn i2c_probe(bus: u8, address: u8) -> Result<bool, InstallError> {
    let output = run(privileged("i2cdetect").args(["-y", &bus.to_string()]))
        .map_err(|reason| InstallError::dependency("i2c-tools", reason))?;
    Ok(i2cdetect_reports(&String::from_utf8_lossy(&output.stdout), address))
}

/// Whether an `i2cdetect` table shows a device (or a bound driver) at `address`.
pub(super) fn i2cdetect_reports(table: &str, address: u8) -> bool {
    for line in table.lines() {
        let Some((row, cells)) = line.split_once(':') else {
            continue;
        };
        let Ok(row) = u8::from_str_radix(row.trim(), 16) else {
            continue;
        };
        // Each cell is three columns wide; leading cells may be blank.
        let cells = cells.as_bytes();
        for col in 0..16u8 {
            let start = usize::from(col) * 3;
            let Some(cell) = cells.get(start..start + 3) else {
                break;
            };
            let cell = String::from_utf8_lossy(cell);
            let cell = cell.trim();
            let occupied = cell == "UU" || u8::from_str_radix(cell, 16).is_ok();
            if row.wrapping_add(col) == address && occupied {
                return true;
            }
        }
    }
    false
}
