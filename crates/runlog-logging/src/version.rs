//! Version discovery for `{name}_{N}.log` files.
//!
//! Everything here is a pure function of the directory listing, so the next
//! version can be computed without opening a session.

use std::io;
use std::path::{Path, PathBuf};

use crate::LogError;

/// File extension used for every versioned log.
pub const LOG_EXTENSION: &str = "log";

/// Check that a base name can be used as a file stem.
pub fn validate_name(base_name: &str) -> Result<(), LogError> {
    let reason = if base_name.is_empty() {
        "name must not be empty"
    } else if base_name.contains(['/', '\\']) {
        "name must not contain path separators"
    } else if base_name.contains('\0') {
        "name must not contain NUL bytes"
    } else {
        return Ok(());
    };

    Err(LogError::InvalidName {
        name: base_name.to_string(),
        reason,
    })
}

/// File name for a given version, e.g. `my_program_3.log`.
pub fn log_file_name(base_name: &str, version: u64) -> String {
    format!("{}_{}.{}", base_name, version, LOG_EXTENSION)
}

/// Full path for a given version inside `directory`.
pub fn log_path(directory: &Path, base_name: &str, version: u64) -> PathBuf {
    directory.join(log_file_name(base_name, version))
}

/// Extract the version from a file name of the form `{base_name}_{digits}.log`.
///
/// Returns `None` for anything else, including digit runs too large for a `u64`.
pub fn parse_version(file_name: &str, base_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(base_name)?
        .strip_prefix('_')?
        .strip_suffix(LOG_EXTENSION)?
        .strip_suffix('.')?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Highest version present in `directory` for `base_name`, or 0 if there is none.
///
/// A missing directory counts as empty.
pub fn current_version(directory: &Path, base_name: &str) -> Result<u64, LogError> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(LogError::fs(directory, e)),
    };

    let mut max = 0;
    for entry in entries {
        let entry = entry.map_err(|e| LogError::fs(directory, e))?;
        let file_name = entry.file_name();
        // Non UTF-8 names can never match a validated base name.
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(version) = parse_version(file_name, base_name) {
            max = max.max(version);
        }
    }

    Ok(max)
}

/// The version the next session for `base_name` in `directory` will receive.
pub fn next_version(directory: &Path, base_name: &str) -> Result<u64, LogError> {
    validate_name(base_name)?;
    let current = current_version(directory, base_name)?;
    current.checked_add(1).ok_or_else(|| {
        LogError::fs(
            directory,
            io::Error::new(io::ErrorKind::Other, "log version space exhausted"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn test_parse_version_matches() {
        assert_eq!(parse_version("foo_1.log", "foo"), Some(1));
        assert_eq!(parse_version("foo_42.log", "foo"), Some(42));
        assert_eq!(parse_version("my_program_7.log", "my_program"), Some(7));
    }

    #[test]
    fn test_parse_version_rejects() {
        assert_eq!(parse_version("foo.log", "foo"), None);
        assert_eq!(parse_version("foo_.log", "foo"), None);
        assert_eq!(parse_version("foo_1.txt", "foo"), None);
        assert_eq!(parse_version("foo_1a.log", "foo"), None);
        assert_eq!(parse_version("foo_-1.log", "foo"), None);
        assert_eq!(parse_version("foobar_1.log", "foo"), None);
        assert_eq!(parse_version("bar_1.log", "foo"), None);
        assert_eq!(parse_version("foo_x_1.log", "foo"), None);
        assert_eq!(
            parse_version("foo_99999999999999999999999.log", "foo"),
            None
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("svc").is_ok());
        assert!(validate_name("my_program").is_ok());
        assert!(validate_name("").unwrap_err().is_invalid_name());
        assert!(validate_name("a/b").unwrap_err().is_invalid_name());
        assert!(validate_name("a\\b").unwrap_err().is_invalid_name());
        assert!(validate_name("a\0b").unwrap_err().is_invalid_name());
    }

    #[test]
    fn test_next_version_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(next_version(dir.path(), "svc").unwrap(), 1);
    }

    #[test]
    fn test_next_version_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not").join("here");
        assert_eq!(next_version(&missing, "svc").unwrap(), 1);
    }

    #[test]
    fn test_next_version_skips_gaps() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "foo_1.log");
        touch(dir.path(), "foo_3.log");
        assert_eq!(next_version(dir.path(), "foo").unwrap(), 4);
    }

    #[test]
    fn test_next_version_ignores_other_names() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "foo_9.txt");
        touch(dir.path(), "foobar_12.log");
        touch(dir.path(), "bar_5.log");
        touch(dir.path(), "foo_2.log");
        assert_eq!(next_version(dir.path(), "foo").unwrap(), 3);
    }

    #[test]
    fn test_log_path() {
        let path = log_path(Path::new("/tmp"), "my_program", 3);
        assert_eq!(path, PathBuf::from("/tmp/my_program_3.log"));
    }
}
