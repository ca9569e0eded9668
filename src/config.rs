//! Configuration types for the photo organiser

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How a file's bytes reach its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Copy files to destination, source is retained
    #[default]
    Copy,
    /// Copy files to destination, then delete the source once the copy is verified
    Move,
}

/// What to do when the destination file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Leave the existing file alone and skip the source
    #[default]
    SkipExisting,
}

/// Configuration for an import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory tree to import from
    #[serde(default)]
    pub source_dir: PathBuf,

    /// Root of the photo library
    #[serde(default)]
    pub target_dir: PathBuf,

    /// File transfer mode
    #[serde(default)]
    pub operation: TransferMode,

    /// Collision handling policy
    #[serde(default)]
    pub collision_policy: CollisionPolicy,

    /// Carry the source modification time over to the destination file
    #[serde(default = "default_true")]
    pub preserve_mtime: bool,

    /// Directory for log files (defaults to `Log/` beside the executable)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            target_dir: PathBuf::new(),
            operation: TransferMode::default(),
            collision_policy: CollisionPolicy::default(),
            preserve_mtime: true,
            log_dir: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Create a configuration for the given source and target with default settings
    pub fn new(source_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            ..Self::default()
        }
    }

    /// Builder-style transfer mode override
    pub fn with_operation(mut self, operation: TransferMode) -> Self {
        self.operation = operation;
        self
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Write the commented sample configuration to `path`
    pub fn write_sample<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_error = |source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, Self::sample_config()).map_err(write_error)
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Photo Organiser Configuration File
# This file uses TOML format (https://toml.io)

# Directory tree to import photos from (camera or phone dump)
source_dir = "D:/CameraDump"

# Root of the photo library
# Photos land in <target_dir>/<year>/<MM> - <MonthName>/<DD>/<filename>
target_dir = "D:/Photos"

# File operation: "copy" or "move"
# - copy: source files are left in place
# - move: source files are deleted after a verified copy
operation = "copy"

# What to do when the destination file already exists
# Only "skip-existing" is supported: re-running an import is a no-op
collision_policy = "skip-existing"

# Keep the source modification time on copied files
preserve_mtime = true

# Verbose output - log skipped files as well as transferred ones
verbose = false
"#
        .to_string()
    }
}

/// Errors that can occur when loading or writing configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::sample_config()).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("D:/CameraDump"));
        assert_eq!(config.target_dir, PathBuf::from("D:/Photos"));
        assert_eq!(config.operation, TransferMode::Copy);
        assert_eq!(config.collision_policy, CollisionPolicy::SkipExisting);
        assert!(config.preserve_mtime);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let config: Config = toml::from_str(
            r#"
source_dir = "in"
target_dir = "out"
operation = "move"
"#,
        )
        .unwrap();
        assert_eq!(config.operation, TransferMode::Move);
        assert_eq!(config.collision_policy, CollisionPolicy::SkipExisting);
        assert!(config.preserve_mtime);
        assert!(!config.verbose);
    }

    #[test]
    fn test_write_sample_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Config").join("import.toml");

        Config::write_sample(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.source_dir, PathBuf::from("D:/CameraDump"));
        assert_eq!(loaded.target_dir, PathBuf::from("D:/Photos"));
        assert_eq!(loaded.operation, TransferMode::Copy);
    }

    #[test]
    fn test_write_sample_into_file_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("Config");
        fs::write(&blocker, "").unwrap();

        let err = Config::write_sample(blocker.join("import.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::WriteError { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Config::load_from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
