//! Root detection and privilege escalation for host changes

use std::process::Command;

use nix::unistd::geteuid;

use crate::install::core::InstallError;

pub(super) fn is_root() -> bool {
    geteuid().is_root()
}

/// `program` as root: directly when already root, through `sudo` otherwise.
pub(super) fn privileged(program: &str) -> Command {
    if is_root() {
        Command::new(program)
    } else {
        let mut cmd = Command::new("sudo");
        cmd.arg(program);
        cmd
    }
}

/// Fail early when host changes are impossible.
pub(super) fn check_privileges() -> Result<(), InstallError> {
    if is_root() || which::which("sudo").is_ok() {
        Ok(())
    } else {
        Err(InstallError::dependency(
            "sudo",
            "not running as root and sudo is not installed",
        ))
    }
}
