//! Error taxonomy shared by every provisioning step

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A step either completes or fails with exactly one of these.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The host is not the hardware class the payload targets.
    #[error(
        "host `{model}` is not a Raspberry Pi; \
         re-run with --allow-unsupported-host to install anyway"
    )]
    EnvironmentMismatch { model: String },

    /// A system package, runtime or runtime requirement could not be installed.
    #[error("failed to install {what}: {reason}")]
    Dependency { what: String, reason: String },

    /// The source tree lacks a required directory or file.
    #[error("source tree is missing required path {}", path.display())]
    RepositoryStructure { path: PathBuf },

    /// A payload group is absent or empty at copy time.
    #[error("payload group `{group}` is missing or empty at {}", path.display())]
    DeploymentSource { group: &'static str, path: PathBuf },

    /// Copy, permission or rewrite failure on the local filesystem.
    #[error("failed to {action} {}: {error}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        error: io::Error,
    },

    /// A service descriptor could not be rendered, installed or activated.
    #[error("{descriptor} setup failed: {reason}")]
    ServiceSetup { descriptor: String, reason: String },
}

impl InstallError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            error,
        }
    }

    pub(crate) fn dependency(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Dependency {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn service(descriptor: impl ToString, reason: impl Into<String>) -> Self {
        Self::ServiceSetup {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable name of the error class, used in the install log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EnvironmentMismatch { .. } => "EnvironmentMismatchError",
            Self::Dependency { .. } => "DependencyError",
            Self::RepositoryStructure { .. } => "RepositoryStructureError",
            Self::DeploymentSource { .. } => "DeploymentSourceError",
            Self::Io { .. } => "IOError",
            Self::ServiceSetup { .. } => "ServiceSetupError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_name_the_path_and_action() {
        let err = InstallError::io(
            "copy",
            "/opt/example/software/TakePhoto.py",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), "IOError");
        assert_eq!(
            err.to_string(),
            "failed to copy /opt/example/software/TakePhoto.py: denied"
        );
    }

    #[test]
    fn structure_errors_carry_the_missing_path() {
        let err = InstallError::RepositoryStructure {
            path: PathBuf::from("/src/config/schedule_settings.csv"),
        };
        assert!(err.to_string().contains("schedule_settings.csv"));
        assert_eq!(err.kind(), "RepositoryStructureError");
    }
}
