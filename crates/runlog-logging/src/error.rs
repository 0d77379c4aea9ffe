use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while creating or writing a versioned log.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("Invalid log name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Filesystem error at {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by a malformed base name rather than I/O.
    pub fn is_invalid_name(&self) -> bool {
        matches!(self, Self::InvalidName { .. })
    }
}
