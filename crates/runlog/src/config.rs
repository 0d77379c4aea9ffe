//! Configuration file support for runlog.
//!
//! Loads `runlog.toml` from the working directory, falling back to the user
//! config directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings loaded from `runlog.toml`
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunlogConfig {
    /// Log file stem
    pub name: Option<String>,
    /// Directory where log files are created
    pub directory: Option<PathBuf>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "runlog.toml";

impl RunlogConfig {
    /// Load configuration from `working_dir`, then from the user config dir.
    ///
    /// Returns `Ok(None)` when neither file exists. A file that exists but does
    /// not parse is a hard error.
    pub fn discover(working_dir: &Path) -> Result<Option<Self>> {
        if let Some(config) = Self::load(working_dir)? {
            return Ok(Some(config));
        }
        match dirs::config_dir() {
            Some(config_dir) => Self::load(&config_dir.join("runlog")),
            None => Ok(None),
        }
    }

    /// Load configuration from a specific directory.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: RunlogConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        tracing::debug!(path = %config_path.display(), "Loaded config");
        Ok(Some(config))
    }
}

/// Effective session settings after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub name: String,
    pub directory: PathBuf,
}

impl SessionSettings {
    /// Priority: CLI flag > config file > default. The name has no default.
    pub fn resolve(
        cli_name: Option<&str>,
        cli_dir: Option<&Path>,
        config: Option<&RunlogConfig>,
        default_dir: PathBuf,
    ) -> Result<Self> {
        let name = cli_name
            .map(String::from)
            .or_else(|| config.and_then(|c| c.name.clone()))
            .with_context(|| {
                format!("No log name given. Use --name or set `name` in {}", CONFIG_FILE_NAME)
            })?;

        let directory = cli_dir
            .map(Path::to_path_buf)
            .or_else(|| config.and_then(|c| c.directory.clone()))
            .unwrap_or(default_dir);

        Ok(Self { name, directory })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(RunlogConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "name = \"my_program\"\ndirectory = \"/var/log/my_program\"\n",
        )
        .unwrap();

        let config = RunlogConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(config.name.as_deref(), Some("my_program"));
        assert_eq!(config.directory, Some(PathBuf::from("/var/log/my_program")));
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "rotate = true\n").unwrap();
        assert!(RunlogConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "name = \n").unwrap();
        assert!(RunlogConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_discover_prefers_working_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "name = \"local\"\n").unwrap();

        let config = RunlogConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(config.name.as_deref(), Some("local"));
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = RunlogConfig {
            name: Some("from_file".to_string()),
            directory: Some(PathBuf::from("/from/file")),
        };
        let settings = SessionSettings::resolve(
            Some("from_cli"),
            Some(Path::new("/from/cli")),
            Some(&config),
            PathBuf::from("/tmp"),
        )
        .unwrap();

        assert_eq!(settings.name, "from_cli");
        assert_eq!(settings.directory, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_resolve_falls_back_to_config_then_default() {
        let config = RunlogConfig {
            name: Some("from_file".to_string()),
            directory: None,
        };
        let settings =
            SessionSettings::resolve(None, None, Some(&config), PathBuf::from("/tmp")).unwrap();

        assert_eq!(settings.name, "from_file");
        assert_eq!(settings.directory, PathBuf::from("/tmp"));
    }

    #[test]
    fn test_resolve_requires_name() {
        let result = SessionSettings::resolve(None, None, None, PathBuf::from("/tmp"));
        assert!(result.is_err());
    }
}
