//! # runlog-logging
//!
//! Versioned, append-only error logs for a single program run.
//!
//! Each run gets its own file, `{name}_{N}.log`, where `N` is one past the
//! highest version already present in the target directory, so earlier runs
//! are never overwritten. Entries carry the time elapsed since the session
//! was opened.
//!
//! ## Key Types
//!
//! - [`VersionedLogger`] - One logging session and its file
//! - [`ErrorOutcome`] - Whether the caller asked to terminate after logging
//! - [`LogError`] - Invalid names and filesystem failures
//! - [`Clock`] - Monotonic time source for elapsed-time stamps
//!
//! ## Usage
//!
//! ```rust,ignore
//! use runlog_logging::VersionedLogger;
//!
//! let logger = VersionedLogger::in_dir("my_program", "/tmp")?;
//! logger.log_event(404, "File not Found")?;
//! // /tmp/my_program_1.log now holds:
//! // [ERROR 404 @ 00:00:00]: File not Found
//! ```

mod clock;
mod entry;
mod error;
mod format;
mod outcome;
mod session;
pub mod version;

pub use clock::{Clock, MonotonicClock};
pub use entry::{format_delta, format_entry};
pub use error::LogError;
pub use format::LogFormat;
pub use outcome::ErrorOutcome;
pub use session::VersionedLogger;
pub use version::next_version;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize diagnostic tracing for the application.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}
