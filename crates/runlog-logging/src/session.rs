use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::clock::{Clock, MonotonicClock};
use crate::entry::format_entry;
use crate::outcome::ErrorOutcome;
use crate::version::{log_path, next_version, validate_name};
use crate::LogError;

/// How many times construction moves on to a later version when another
/// process creates the chosen file first.
const MAX_CREATE_ATTEMPTS: usize = 16;

/// An append-only error log whose file name carries a per-run version.
///
/// Construction picks `{directory}/{base_name}_{N}.log` where `N` is one past
/// the highest version already on disk, creates it, and starts the session
/// clock. Every entry records the time elapsed since then.
pub struct VersionedLogger {
    base_name: String,
    directory: PathBuf,
    version: u64,
    path: PathBuf,
    start: Instant,
    started_at: DateTime<Utc>,
    clock: Box<dyn Clock>,
    file: Mutex<File>,
}

impl VersionedLogger {
    /// Open a new session in the platform temp directory.
    pub fn new(base_name: &str) -> Result<Self, LogError> {
        Self::in_dir(base_name, Self::default_directory())
    }

    /// Open a new session in `directory`, creating the directory if needed.
    pub fn in_dir(base_name: &str, directory: impl AsRef<Path>) -> Result<Self, LogError> {
        Self::with_clock(base_name, directory, MonotonicClock)
    }

    /// Open a new session that reads elapsed time from `clock`.
    pub fn with_clock(
        base_name: &str,
        directory: impl AsRef<Path>,
        clock: impl Clock + 'static,
    ) -> Result<Self, LogError> {
        validate_name(base_name)?;
        let directory = directory.as_ref();
        fs::create_dir_all(directory).map_err(|e| LogError::fs(directory, e))?;

        let (version, path, file) = Self::create_next(directory, base_name)?;
        let start = clock.now();

        tracing::debug!(path = %path.display(), version, "Created versioned log");

        Ok(Self {
            base_name: base_name.to_string(),
            directory: directory.to_path_buf(),
            version,
            path,
            start,
            started_at: Utc::now(),
            clock: Box::new(clock),
            file: Mutex::new(file),
        })
    }

    /// Directory used when the caller does not pick one.
    pub fn default_directory() -> PathBuf {
        std::env::temp_dir()
    }

    fn create_next(directory: &Path, base_name: &str) -> Result<(u64, PathBuf, File), LogError> {
        let mut version = next_version(directory, base_name)?;
        let mut attempts = 1;

        loop {
            let path = log_path(directory, base_name, version);
            match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => return Ok((version, path, file)),
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists
                        && attempts < MAX_CREATE_ATTEMPTS =>
                {
                    tracing::warn!(path = %path.display(), "Log file already exists, trying next version");
                    attempts += 1;
                    version = next_version(directory, base_name)?.max(version.saturating_add(1));
                }
                Err(e) => return Err(LogError::fs(path, e)),
            }
        }
    }

    /// Append `[ERROR {code} @ HH:MM:SS]: {message}` to the log.
    ///
    /// On failure the file is cut back to its previous length so no partial
    /// line is left behind.
    pub fn log_event(&self, code: i64, message: &str) -> Result<(), LogError> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);

        // Read the clock under the lock so entries land in delta order.
        let line = format_entry(code, self.elapsed(), message);
        let len = file
            .metadata()
            .map_err(|e| LogError::fs(&self.path, e))?
            .len();

        let written = file.write_all(line.as_bytes()).and_then(|()| file.flush());
        if let Err(e) = written {
            if let Err(rollback) = file.set_len(len) {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "Failed to roll back partial log entry"
                );
            }
            return Err(LogError::fs(&self.path, e));
        }

        Ok(())
    }

    /// Log an entry and report whether the caller asked to terminate.
    ///
    /// The process is never exited here; the returned outcome tells the
    /// caller what it asked for.
    pub fn error(
        &self,
        code: i64,
        message: &str,
        should_exit: bool,
    ) -> Result<ErrorOutcome, LogError> {
        self.log_event(code, message)?;
        Ok(if should_exit {
            ErrorOutcome::Terminate { code }
        } else {
            ErrorOutcome::Continue
        })
    }

    /// Time elapsed since the session started.
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Wall-clock time the session was opened.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl std::fmt::Debug for VersionedLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedLogger")
            .field("path", &self.path)
            .field("version", &self.version)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
