use serde::Serialize;

/// What the caller of [`VersionedLogger::error`](crate::VersionedLogger::error)
/// asked to happen after the entry was written.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ErrorOutcome {
    /// Keep running
    Continue,
    /// The caller requested termination after logging `code`
    Terminate { code: i64 },
}

impl ErrorOutcome {
    pub fn should_exit(&self) -> bool {
        matches!(self, Self::Terminate { .. })
    }

    /// Suggested process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Continue => 0,
            Self::Terminate { .. } => 1,
        }
    }
}
