//! Append-only install log mirrored to the console and `logs/install.log`

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::warn;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

/// One line of the install log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self.timestamp.format(TIMESTAMP_FORMAT);
        match self.level {
            LogLevel::Info => write!(f, "[{ts}] {}", self.message),
            LogLevel::Error => write!(f, "[{ts}] ERROR: {}", self.message),
        }
    }
}

/// Install log for a single run.
///
/// Entries go to the console immediately. The log file lives inside the
/// target tree, which may not exist yet when the run starts, so entries are
/// also kept in memory and flushed to the file once [`InstallLog::try_attach`]
/// finds its directory.
pub struct InstallLog {
    entries: Vec<LogEntry>,
    console: Box<dyn Write>,
    file_path: PathBuf,
    file: Option<File>,
}

impl InstallLog {
    pub fn new(file_path: impl Into<PathBuf>, console: Box<dyn Write>) -> Self {
        Self {
            entries: Vec::new(),
            console,
            file_path: file_path.into(),
            file: None,
        }
    }

    /// Log that mirrors to standard output.
    pub fn to_stdout(file_path: impl Into<PathBuf>) -> Self {
        Self::new(file_path, Box::new(io::stdout()))
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Info, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(LogLevel::Error, message.into());
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn is_persisted(&self) -> bool {
        self.file.is_some()
    }

    /// Open the log file if its directory exists, writing any buffered entries.
    ///
    /// Never creates directories. Returns whether the file is attached.
    pub fn try_attach(&mut self) -> bool {
        if self.file.is_some() {
            return true;
        }
        let Some(dir) = self.file_path.parent() else {
            return false;
        };
        if !dir.is_dir() {
            return false;
        }

        let opened = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .and_then(|mut file| {
                for entry in &self.entries {
                    writeln!(file, "{entry}")?;
                }
                Ok(file)
            });

        match opened {
            Ok(file) => {
                self.file = Some(file);
                true
            }
            Err(e) => {
                warn!("Cannot open install log {}: {e}", self.file_path.display());
                false
            }
        }
    }

    /// Text of the persisted log, if any.
    pub fn read_persisted(&self) -> io::Result<String> {
        fs::read_to_string(&self.file_path)
    }

    fn record(&mut self, level: LogLevel, message: String) {
        let entry = LogEntry {
            timestamp: Local::now(),
            level,
            message,
        };

        if let Err(e) = writeln!(self.console, "{entry}") {
            warn!("Console log write failed: {e}");
        }

        if let Some(file) = self.file.as_mut()
            && let Err(e) = writeln!(file, "{entry}")
        {
            warn!(
                "Install log write to {} failed, continuing without it: {e}",
                self.file_path.display()
            );
            self.file = None;
        }

        self.entries.push(entry);
    }
}

impl fmt::Debug for InstallLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallLog")
            .field("entries", &self.entries.len())
            .field("file_path", &self.file_path)
            .field("persisted", &self.file.is_some())
            .finish()
    }
}
