//! Atomic writes and payload copies inside the target tree

use std::fs::{self, Permissions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use super::core::InstallError;
use super::layout::SKIPPED_ARTIFACTS;

/// Write `contents` to a sibling temp file, then rename it over `path`.
///
/// A crash leaves either the old file or the new one, never a mix. When
/// `mode` is `None` the existing file's mode is kept (or the default for a
/// new file).
pub fn write_file_atomic(
    path: &Path,
    contents: &[u8],
    mode: Option<u32>,
) -> Result<(), InstallError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mode = mode.or_else(|| {
        fs::metadata(path)
            .ok()
            .map(|meta| meta.permissions().mode() & 0o7777)
    });

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| InstallError::io("stage", dir, e))?;
    temp.write_all(contents)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| InstallError::io("write", temp.path().to_path_buf(), e))?;
    if let Some(mode) = mode {
        temp.as_file()
            .set_permissions(Permissions::from_mode(mode))
            .map_err(|e| InstallError::io("set permissions on", path, e))?;
    }
    temp.persist(path)
        .map_err(|e| InstallError::io("replace", path, e.error))?;
    Ok(())
}

/// Whether `path` is a directory with at least one entry.
pub fn has_entries(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

pub fn copy_file(from: &Path, to: &Path) -> Result<(), InstallError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| InstallError::io("create", parent, e))?;
    }
    fs::copy(from, to).map_err(|e| InstallError::io("copy", from, e))?;
    debug!("Copied {} -> {}", from.display(), to.display());
    Ok(())
}

fn is_artifact(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    SKIPPED_ARTIFACTS.contains(&name) || name.ends_with(".pyc")
}

/// Recursively copy the contents of `from` into `to`, overwriting files.
///
/// Symlinks inside the source are followed; caches and VCS metadata are
/// skipped. Returns the files written.
pub fn copy_tree(from: &Path, to: &Path) -> Result<Vec<PathBuf>, InstallError> {
    let mut copied = Vec::new();
    let walker = WalkDir::new(from)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_artifact(entry.path()));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            InstallError::io("read", path, e.into())
        })?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let dest = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| InstallError::io("create", &dest, e))?;
        } else {
            copy_file(entry.path(), &dest)?;
            copied.push(dest);
        }
    }
    Ok(copied)
}
