//! Copies the payload groups into the scaffolded tree

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::install::core::{InstallError, InstallLog, InstallationContext, Step, StepEnv};
use crate::install::file_ops::{copy_file, copy_tree, has_entries};
use crate::install::layout;

pub const STEP: Step = Step::new("deploy payload", true, skeleton_exists, run);

/// Required payload groups, in copy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadGroup {
    Scripts,
    Configuration,
    DashboardEntry,
    StaticAssets,
}

impl PayloadGroup {
    pub const ALL: [PayloadGroup; 4] = [
        Self::Scripts,
        Self::Configuration,
        Self::DashboardEntry,
        Self::StaticAssets,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Scripts => "scripts",
            Self::Configuration => "configuration",
            Self::DashboardEntry => "dashboard entry point",
            Self::StaticAssets => "static assets",
        }
    }

    pub fn source(self, ctx: &InstallationContext) -> PathBuf {
        match self {
            Self::Scripts => ctx.source_path(layout::SOURCE_SOFTWARE_DIR),
            Self::Configuration => ctx.source_path(layout::SOURCE_CONFIG_DIR),
            Self::DashboardEntry => ctx
                .source_path(layout::SOURCE_WEB_DIR)
                .join(layout::DASHBOARD_ENTRY),
            Self::StaticAssets => ctx.source_path(layout::SOURCE_STATIC_DIR),
        }
    }

    fn is_present(self, source: &Path) -> bool {
        match self {
            Self::DashboardEntry => {
                fs::metadata(source).is_ok_and(|m| m.is_file() && m.len() > 0)
            }
            _ => source.is_dir() && has_entries(source),
        }
    }

    /// Copy this group, returning the files written.
    ///
    /// A group that is missing, or that yields no files once caches are
    /// skipped, is a `DeploymentSource` error.
    pub fn deploy(self, ctx: &InstallationContext) -> Result<Vec<PathBuf>, InstallError> {
        let source = self.source(ctx);
        if !self.is_present(&source) {
            return Err(self.unusable(source));
        }

        let copied = match self {
            Self::Scripts => copy_tree(&source, &ctx.software_dir())?,
            Self::Configuration => copy_top_level_files(&source, &ctx.target_dir)?,
            Self::DashboardEntry => {
                let dest = ctx.dashboard_entry();
                copy_file(&source, &dest)?;
                vec![dest]
            }
            Self::StaticAssets => copy_tree(&source, &ctx.static_dir())?,
        };
        if copied.is_empty() {
            return Err(self.unusable(source));
        }
        Ok(copied)
    }

    fn unusable(self, path: PathBuf) -> InstallError {
        InstallError::DeploymentSource {
            group: self.name(),
            path,
        }
    }
}

/// Configuration lives flat at the installation root.
fn copy_top_level_files(from: &Path, to: &Path) -> Result<Vec<PathBuf>, InstallError> {
    let mut copied = Vec::new();
    let entries = fs::read_dir(from).map_err(|e| InstallError::io("read", from, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let dest = to.join(name);
        copy_file(&file, &dest)?;
        copied.push(dest);
    }
    Ok(copied)
}

fn skeleton_exists(ctx: &InstallationContext) -> Result<(), InstallError> {
    for dir in [ctx.software_dir(), ctx.web_dir(), ctx.static_dir()] {
        if !dir.is_dir() {
            return Err(InstallError::io(
                "find",
                dir,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
    }
    Ok(())
}

fn run(env: &mut StepEnv<'_>) -> Result<(), InstallError> {
    for group in PayloadGroup::ALL {
        let copied = group.deploy(env.ctx)?;
        env.log.info(format!("Deployed {} ({} files)", group.name(), copied.len()));
    }

    deploy_optional(env.ctx, env.log);
    deploy_support_modules(env.ctx, env.log);
    Ok(())
}

/// README and license, when the source has them.
fn deploy_optional(ctx: &InstallationContext, log: &mut InstallLog) {
    for doc in layout::OPTIONAL_DOCS {
        let source = ctx.source_path(doc);
        if !source.is_file() {
            continue;
        }
        match copy_file(&source, &ctx.target_dir.join(doc)) {
            Ok(()) => log.info(format!("Copied {doc}")),
            Err(e) => warn!("Skipping {doc}: {e}"),
        }
    }
}

/// Modules and packages the dashboard imports from its own directory.
pub fn support_modules(ctx: &InstallationContext) -> Vec<PathBuf> {
    let web = ctx.source_path(layout::SOURCE_WEB_DIR);
    let Ok(entries) = fs::read_dir(&web) else {
        return Vec::new();
    };

    let mut modules: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name == layout::DASHBOARD_ENTRY
                || name == layout::STATIC_DIR
                || layout::SKIPPED_ARTIFACTS.contains(&name)
            {
                return false;
            }
            if path.is_dir() {
                path.join("__init__.py").is_file()
            } else {
                layout::has_extension(path, &["py"])
            }
        })
        .collect();
    modules.sort();
    modules
}

fn deploy_support_modules(ctx: &InstallationContext, log: &mut InstallLog) {
    let mut copied = 0;
    for module in support_modules(ctx) {
        let Some(name) = module.file_name() else {
            continue;
        };
        let dest = ctx.web_dir().join(name);
        let result = if module.is_dir() {
            copy_tree(&module, &dest).map(|files| files.len())
        } else {
            copy_file(&module, &dest).map(|()| 1)
        };
        match result {
            Ok(n) => copied += n,
            Err(e) => warn!("Skipping dashboard module {}: {e}", module.display()),
        }
    }
    if copied > 0 {
        log.info(format!("Deployed {copied} dashboard support files"));
    }
}
