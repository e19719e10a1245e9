//! Example schedule written next to the installation

use std::collections::BTreeMap;
use std::io;

use crate::install::core::{InstallError, InstallationContext, Step, StepEnv};
use crate::install::file_ops::write_file_atomic;
use crate::install::services::render;

pub const STEP: Step = Step::new("write crontab example", true, target_exists, run);

const CRONTAB_TEMPLATE: &str = include_str!("../../../templates/crontab.template");

pub fn render_crontab(ctx: &InstallationContext) -> Result<String, InstallError> {
    let example = ctx.crontab_example();
    let values: BTreeMap<&'static str, String> = [
        ("crontab_file", example.to_string_lossy().into_owned()),
        ("interpreter", ctx.interpreter().to_string_lossy().into_owned()),
        ("target_dir", ctx.target_str()),
    ]
    .into_iter()
    .collect();

    let mut rendered = render(CRONTAB_TEMPLATE, &values)
        .map_err(|reason| InstallError::io("render", &example, io::Error::other(reason)))?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

/// Schedule lines, without comments or blanks.
pub fn task_lines(crontab: &str) -> Vec<&str> {
    crontab
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

fn target_exists(ctx: &InstallationContext) -> Result<(), InstallError> {
    if ctx.target_dir.is_dir() {
        Ok(())
    } else {
        Err(InstallError::io(
            "find",
            &ctx.target_dir,
            io::Error::from(io::ErrorKind::NotFound),
        ))
    }
}

fn run(env: &mut StepEnv<'_>) -> Result<(), InstallError> {
    let path = env.ctx.crontab_example();
    let contents = render_crontab(env.ctx)?;
    write_file_atomic(&path, contents.as_bytes(), Some(0o644))?;
    env.log.info(format!(
        "Wrote example schedule to {}; install it with `crontab {}`",
        path.display(),
        path.display()
    ));
    Ok(())
}
