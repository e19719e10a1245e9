//! Interactive prompts for `--interactive`

use std::path::PathBuf;

use anyhow::Result;
use inquire::{Confirm, Text};

use super::backend::EXPECTED_HARDWARE;
use super::core::InstallationContext;
use crate::cli::Cli;

/// What the operator chose; applied as if given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardAnswers {
    pub target_dir: PathBuf,
    pub runtime_env: Option<PathBuf>,
    pub allow_unsupported_host: bool,
}

impl WizardAnswers {
    pub fn apply(self, cli: &mut Cli) {
        cli.target_dir = Some(self.target_dir);
        match self.runtime_env {
            Some(env) => {
                cli.venv = Some(env);
                cli.no_venv = false;
            }
            None => {
                cli.venv = None;
                cli.no_venv = true;
            }
        }
        cli.allow_unsupported_host |= self.allow_unsupported_host;
    }
}

/// Ask for the installation paths, offering the resolved values as defaults.
pub fn prompt(ctx: &InstallationContext, host_model: Option<&str>) -> Result<WizardAnswers> {
    let target = Text::new("Install CreatureBox into:")
        .with_default(&ctx.target_dir.to_string_lossy())
        .prompt()?;

    let use_env = Confirm::new("Use an isolated Python environment?")
        .with_default(ctx.runtime_env_path.is_some())
        .with_help_message("Keeps the dashboard's Python packages separate from the system's")
        .prompt()?;

    let runtime_env = if use_env {
        let default_env = ctx
            .runtime_env_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}-env", ctx.target_dir.display())));
        let env = Text::new("Isolated environment path:")
            .with_default(&default_env.to_string_lossy())
            .prompt()?;
        Some(PathBuf::from(env.trim()))
    } else {
        None
    };

    let supported = host_model.is_some_and(|m| m.contains(EXPECTED_HARDWARE));
    let allow_unsupported_host = if supported || ctx.allow_unsupported_host {
        ctx.allow_unsupported_host
    } else {
        let model = host_model.unwrap_or("unknown hardware");
        Confirm::new(&format!(
            "This host ({model}) is not a {EXPECTED_HARDWARE}. Install anyway?"
        ))
        .with_default(false)
        .prompt()?
    };

    Ok(WizardAnswers {
        target_dir: PathBuf::from(target.trim()),
        runtime_env,
        allow_unsupported_host,
    })
}
