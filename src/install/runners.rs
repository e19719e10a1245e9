//! Top-level installer run: resolve settings, pick a backend, report

use std::io::Write;

use anyhow::{Context, Result};
use log::info;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::backend::{ProvisioningBackend, SystemPaths, read_host_model};
use super::core::{InstallLog, InstallSummary, InstallationContext, Pipeline, PipelineFailure};
use super::linux::SystemBackend;
use super::recording::RecordingBackend;
use super::wizard;
use crate::cli::Cli;
use crate::config::{HostDefaults, InstallConfig, resolve_context};

/// Run the installer for `cli`. Any error maps to exit code 1.
pub fn run(mut cli: Cli) -> Result<()> {
    let host = HostDefaults::detect()?;
    let file = match &cli.config {
        Some(path) => InstallConfig::load(path)?,
        None => InstallConfig::default(),
    };
    let paths = SystemPaths::default();

    if cli.interactive {
        let proposed = resolve_context(&cli, &file, &host)?;
        let model = read_host_model(&paths.device_model);
        let answers = wizard::prompt(&proposed, model.as_deref())
            .context("Interactive setup was cancelled")?;
        answers.apply(&mut cli);
    }

    let ctx = resolve_context(&cli, &file, &host)?;
    info!("Resolved installation context: {ctx:?}");
    show_banner(&ctx, cli.dry_run);

    let mut log = InstallLog::to_stdout(ctx.log_file.clone());
    let mut pipeline = Pipeline::standard();

    if cli.dry_run {
        let backend = RecordingBackend::dry_run(paths);
        let outcome = execute(&mut pipeline, &ctx, &backend, &mut log);
        show_planned_changes(&backend);
        outcome
    } else {
        let backend = SystemBackend::new(paths);
        execute(&mut pipeline, &ctx, &backend, &mut log)
    }
}

fn execute(
    pipeline: &mut Pipeline,
    ctx: &InstallationContext,
    backend: &dyn ProvisioningBackend,
    log: &mut InstallLog,
) -> Result<()> {
    match pipeline.run(ctx, backend, log) {
        Ok(summary) => {
            show_summary(&summary);
            Ok(())
        }
        Err(failure) => {
            show_failure(&failure, ctx);
            Err(failure.into())
        }
    }
}

fn show_banner(ctx: &InstallationContext, dry_run: bool) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "🦋 CreatureBox Installation");
    let _ = stdout.reset();
    let _ = writeln!(stdout, "   Source:  {}", ctx.source_root.display());
    let _ = writeln!(stdout, "   Target:  {}", ctx.target_dir.display());
    match &ctx.runtime_env_path {
        Some(env) => {
            let _ = writeln!(stdout, "   Python:  {}", env.display());
        }
        None => {
            let _ = writeln!(stdout, "   Python:  system interpreter");
        }
    }
    let _ = writeln!(stdout, "   Port:    {}", ctx.service_port);
    if dry_run {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
        let _ = writeln!(
            stdout,
            "   Dry run: files are deployed, packages and services are only listed"
        );
        let _ = stdout.reset();
    }
    let _ = writeln!(stdout);
}

fn show_summary(summary: &InstallSummary) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "\n✅ CreatureBox installed in {}", summary.target_dir.display());
    let _ = stdout.reset();

    let _ = writeln!(stdout, "\n📍 Dashboard:");
    for url in &summary.dashboard_urls {
        let _ = writeln!(stdout, "   {url}");
    }
    let _ = writeln!(stdout, "\n📝 Install log: {}", summary.log_file.display());
    let _ = writeln!(
        stdout,
        "⏰ Example schedule: {} (install with `crontab {}`)",
        summary.crontab_example.display(),
        summary.crontab_example.display()
    );
}

fn show_failure(failure: &PipelineFailure, ctx: &InstallationContext) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = writeln!(stderr, "\n❌ Installation failed at step `{}`", failure.step);
    let _ = stderr.reset();
    let _ = writeln!(stderr, "   {}: {}", failure.error.kind(), failure.error);
    if ctx.log_file.is_file() {
        let _ = writeln!(stderr, "   Details: {}", ctx.log_file.display());
    }
}

fn show_planned_changes(backend: &RecordingBackend) {
    let actions = backend.actions();
    if actions.is_empty() {
        return;
    }
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    let _ = writeln!(stdout, "\nHost changes a real run would make:");
    let _ = stdout.reset();
    for action in actions {
        let _ = writeln!(stdout, "  • {action}");
    }
}
