//! Core installer structures: context, log, errors and the step pipeline

mod context;
mod error;
mod install_log;
mod legacy;
mod pipeline;
mod step;

pub use context::{DEFAULT_HOST_ALIAS, DEFAULT_SERVICE_PORT, InstallationContext, SYSTEM_PYTHON};
pub use error::InstallError;
pub use install_log::{InstallLog, LogEntry, LogLevel};
pub use legacy::{DEFAULT_LEGACY_ROOTS, LegacyPathTable, PathRewrite, rewrite_content};
pub use pipeline::{InstallSummary, Pipeline, PipelineFailure, PipelineState};
pub use step::{Action, Precondition, Step, StepEnv, always};
