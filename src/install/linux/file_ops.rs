//! Writes into root-owned configuration directories

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process::{Child, ExitStatus, Stdio};

use tempfile::NamedTempFile;

use super::privileges::{is_root, privileged};
use super::service_control::run;
use crate::install::file_ops::write_file_atomic;

/// Place `contents` at `path` with `mode`, creating the parent directory.
///
/// As root the file is written atomically in place; otherwise it is staged
/// in a temp file and moved into position with `sudo install`.
pub(super) fn install_file(path: &Path, contents: &str, mode: u32) -> Result<(), String> {
    if is_root() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
        return write_file_atomic(path, contents.as_bytes(), Some(mode))
            .map_err(|e| e.to_string());
    }

    let mut staged = NamedTempFile::new().map_err(|e| format!("failed to stage file: {e}"))?;
    staged
        .write_all(contents.as_bytes())
        .and_then(|()| staged.flush())
        .map_err(|e| format!("failed to stage file: {e}"))?;
    run(privileged("install")
        .args(["-D", "-m", &format!("{mode:o}")])
        .arg(staged.path())
        .arg(path))
    .map(|_| ())
}

/// Append `text` to a root-owned file.
pub(super) fn append(path: &Path, text: &str) -> Result<(), String> {
    if is_root() {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| format!("failed to open {}: {e}", path.display()))?;
        return file
            .write_all(text.as_bytes())
            .map_err(|e| format!("failed to append to {}: {e}", path.display()));
    }

    let mut child = privileged("tee")
        .arg("-a")
        .arg(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .map_err(|e| format!("failed to execute tee: {e}"))?;
    let status = feed(&mut child, text)?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("`tee -a {}` exited with {status}", path.display()))
    }
}

/// Write `text` to `child`'s stdin, close it and reap the child.
///
/// The child is killed and reaped when the write fails.
fn feed(child: &mut Child, text: &str) -> Result<ExitStatus, String> {
    if let Some(mut stdin) = child.stdin.take() {
        let written = stdin.write_all(text.as_bytes());
        drop(stdin);
        if let Err(e) = written {
            let _ = child.kill();
            let _ = child.wait();
            return Err(format!("failed to write to tee: {e}"));
        }
    }
    child
        .wait()
        .map_err(|e| format!("failed to wait for tee: {e}"))
}

/// Point `link` at `target`, replacing an existing link.
pub(super) fn link(target: &Path, link: &Path) -> Result<(), String> {
    run(privileged("ln").arg("-sfn").arg(target).arg(link)).map(|_| ())
}

pub(super) fn remove(path: &Path) -> Result<(), String> {
    run(privileged("rm").arg("-f").arg(path)).map(|_| ())
}
