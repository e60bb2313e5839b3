use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

use crate::error::Error;

pub const DEFAULT_ARCHIVE_DIR: &str = "EXISTING";
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// What to do when a synthesized `_N` name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenamePolicy {
    /// Try `_1`, `_2`, ... until a free name is found.
    #[default]
    Increment,
    /// Only ever try `_1`; a taken name is a `NameCollision` error.
    Fixed,
}

/// Whether files diverted to the archive subtree are added to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchivePolicy {
    #[default]
    Unregistered,
    Registered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log the failure, record it in the report and move on to the next file.
    #[default]
    Continue,
    /// Abort the run on the first failure.
    FailFast,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name of the archive directory at the root. Never scanned.
    pub archive_dir: String,
    /// Read size used when hashing file content.
    pub block_size: usize,
    /// Glob patterns for files and directories to leave alone.
    pub ignore_patterns: Vec<String>,
    pub rename_policy: RenamePolicy,
    pub archive_policy: ArchivePolicy,
    pub error_policy: ErrorPolicy,
    /// Register files already sitting in category folders before walking.
    pub seed_existing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            archive_dir: DEFAULT_ARCHIVE_DIR.to_string(),
            block_size: DEFAULT_BLOCK_SIZE,
            ignore_patterns: Vec::new(),
            rename_policy: RenamePolicy::default(),
            archive_policy: ArchivePolicy::default(),
            error_policy: ErrorPolicy::default(),
            seed_existing: false,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.block_size == 0 {
            return Err(Error::InvalidConfig(
                "block_size must be greater than zero".to_string(),
            ));
        }
        if self.archive_dir.is_empty()
            || self.archive_dir == "."
            || self.archive_dir == ".."
            || self.archive_dir.contains(['/', '\\'])
        {
            return Err(Error::InvalidConfig(format!(
                "archive_dir '{}' must be a single directory name",
                self.archive_dir
            )));
        }
        Ok(())
    }
}

/// Load configuration from an optional `Config.toml` and `SORTER_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("SORTER").try_parsing(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.archive_dir, "EXISTING");
        assert_eq!(config.block_size, 65536);
        assert_eq!(config.rename_policy, RenamePolicy::Increment);
        assert_eq!(config.archive_policy, ArchivePolicy::Unregistered);
        assert_eq!(config.error_policy, ErrorPolicy::Continue);
        assert!(!config.seed_existing);
    }

    #[test]
    fn test_validate_rejects_zero_block_size() {
        let config = AppConfig {
            block_size: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_nested_archive_dir() {
        for name in ["", "a/b", "..", "x\\y"] {
            let config = AppConfig {
                archive_dir: name.to_string(),
                ..AppConfig::default()
            };
            assert!(config.validate().is_err(), "accepted '{}'", name);
        }
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AppConfig = Config::builder()
            .set_override("rename_policy", "fixed")
            .unwrap()
            .set_override("seed_existing", true)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.rename_policy, RenamePolicy::Fixed);
        assert!(config.seed_existing);
        assert_eq!(config.archive_dir, DEFAULT_ARCHIVE_DIR);
        assert_eq!(config.error_policy, ErrorPolicy::Continue);
    }
}
