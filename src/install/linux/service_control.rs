//! Blocking invocations of systemctl, nginx and friends

use std::process::{Command, Output};

use log::debug;

use super::privileges::privileged;

fn describe(cmd: &Command) -> String {
    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

/// Run `cmd` to completion; a non-zero exit becomes its stderr.
pub(super) fn run(cmd: &mut Command) -> Result<Output, String> {
    let line = describe(cmd);
    debug!("Running {line}");

    let output = cmd
        .output()
        .map_err(|e| format!("failed to execute `{line}`: {e}"))?;
    if output.status.success() {
        return Ok(output);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.trim();
    Err(if detail.is_empty() {
        format!("`{line}` exited with {}", output.status)
    } else {
        format!("`{line}` failed: {detail}")
    })
}

pub(super) fn systemctl(args: &[&str]) -> Result<(), String> {
    run(privileged("systemctl").args(args)).map(|_| ())
}

/// Reload unit files so systemd picks up changes
pub(super) fn reload_systemd_daemon() -> Result<(), String> {
    systemctl(&["daemon-reload"])
}

pub(super) fn enable_service(unit: &str) -> Result<(), String> {
    systemctl(&["enable", unit])
}

/// Restart rather than start so a re-run applies the new unit file.
pub(super) fn restart_service(unit: &str) -> Result<(), String> {
    systemctl(&["restart", unit])
}

pub(super) fn reload_or_restart_service(unit: &str) -> Result<(), String> {
    systemctl(&["reload-or-restart", unit])
}

/// Validate the complete nginx configuration before reloading it.
pub(super) fn test_nginx_config() -> Result<(), String> {
    run(privileged("nginx").arg("-t")).map(|_| ())
}
