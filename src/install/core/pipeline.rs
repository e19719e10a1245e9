//! Fail-fast step sequencing
//!
//! `PENDING -> RUNNING(i) -> RUNNING(i + 1) | FAILED | COMPLETE`. The first
//! failing step ends the run; completed steps are not undone.

use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use super::context::InstallationContext;
use super::error::InstallError;
use super::install_log::InstallLog;
use super::step::{Step, StepEnv};
use crate::install::backend::ProvisioningBackend;
use crate::install::steps;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Running { index: usize, step: &'static str },
    Failed { step: &'static str },
    Complete,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Complete)
    }
}

/// The step that stopped the run and why.
#[derive(Debug, Error)]
#[error("step `{step}` failed: {error}")]
pub struct PipelineFailure {
    pub step: &'static str,
    pub error: InstallError,
}

/// What a completed run leaves behind for the user.
#[derive(Debug, Clone)]
pub struct InstallSummary {
    pub target_dir: PathBuf,
    pub dashboard_urls: Vec<String>,
    pub log_file: PathBuf,
    pub crontab_example: PathBuf,
    pub completed_steps: Vec<&'static str>,
}

impl InstallSummary {
    fn for_context(ctx: &InstallationContext, completed_steps: Vec<&'static str>) -> Self {
        Self {
            target_dir: ctx.target_dir.clone(),
            dashboard_urls: vec![
                format!("http://{}/", ctx.host_name()),
                format!("http://localhost:{}/", ctx.service_port),
            ],
            log_file: ctx.log_file.clone(),
            crontab_example: ctx.crontab_example(),
            completed_steps,
        }
    }
}

#[derive(Debug)]
pub struct Pipeline {
    steps: Vec<Step>,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            state: PipelineState::Pending,
            history: vec![PipelineState::Pending],
        }
    }

    /// Validator, provisioner, scaffolder, deployer, migrator, permissions,
    /// symlinks, services, crontab.
    pub fn standard() -> Self {
        Self::new(steps::standard_steps())
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Every state the pipeline has entered, in order.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// Running a finished pipeline again starts over from `PENDING`.
    pub fn run(
        &mut self,
        ctx: &InstallationContext,
        backend: &dyn ProvisioningBackend,
        log: &mut InstallLog,
    ) -> Result<InstallSummary, PipelineFailure> {
        if self.state != PipelineState::Pending {
            debug!("Restarting pipeline from {:?}", self.state);
            self.state = PipelineState::Pending;
            self.history = vec![PipelineState::Pending];
        }

        // A previous run may already have created the log directory.
        log.try_attach();
        log.info(format!(
            "Installing CreatureBox from {} into {}",
            ctx.source_root.display(),
            ctx.target_dir.display()
        ));

        let total = self.steps.len();
        let mut completed = Vec::with_capacity(total);

        for index in 0..total {
            let step = self.steps[index];
            self.transition(PipelineState::Running {
                index,
                step: step.name,
            });
            log.info(format!("Step {}/{}: {}", index + 1, total, step.name));

            let outcome = match step.check(ctx) {
                Ok(()) => {
                    let mut env = StepEnv {
                        ctx,
                        backend,
                        log: &mut *log,
                    };
                    step.run(&mut env)
                }
                Err(e) => Err(e),
            };
            log.try_attach();

            if let Err(error) = outcome {
                self.transition(PipelineState::Failed { step: step.name });
                log.error(format!("{} failed ({}): {error}", step.name, error.kind()));
                if step.idempotent {
                    log.info(
                        "Fix the problem above and re-run the installer; \
                         completed steps are safe to repeat",
                    );
                }
                return Err(PipelineFailure {
                    step: step.name,
                    error,
                });
            }
            completed.push(step.name);
        }

        self.transition(PipelineState::Complete);
        let summary = InstallSummary::for_context(ctx, completed);
        log.info(format!(
            "Installation complete. Dashboard: {}",
            summary.dashboard_urls.join(" or ")
        ));
        log.info(format!("Install log: {}", summary.log_file.display()));
        Ok(summary)
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Pipeline {:?} -> {:?}", self.state, next);
        self.state = next.clone();
        self.history.push(next);
    }
}
