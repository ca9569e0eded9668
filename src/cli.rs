//! CLI argument parsing with clap

use crate::config::{Config, TransferMode};
use clap::Parser;
use std::path::PathBuf;

/// Photo Organiser - sort a camera dump into a dated photo library
///
/// Copies every file under SOURCE into TARGET/<year>/<MM> - <Month>/<DD>/
/// using the original capture date stored in the file's EXIF data.
/// Files that already exist at their destination are skipped.
#[derive(Parser, Debug)]
#[command(name = "photo-organiser")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to import photos from (must exist)
    pub source: Option<PathBuf>,

    /// Root of the photo library (created if absent)
    pub target: Option<PathBuf>,

    /// Path to configuration file (TOML format)
    ///
    /// Positional arguments and flags override values from the file.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// File operation mode
    #[arg(short = 'O', long, value_enum)]
    pub operation: Option<TransferMode>,

    /// Do not copy the source modification time onto imported files
    #[arg(long)]
    pub no_preserve_mtime: bool,

    /// Directory for log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Write a commented sample configuration file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub write_sample_config: Option<PathBuf>,
}

impl Cli {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref source) = self.source {
            config.source_dir = source.clone();
        }
        if let Some(ref target) = self.target {
            config.target_dir = target.clone();
        }
        if let Some(operation) = self.operation {
            config.operation = operation;
        }
        if self.no_preserve_mtime {
            config.preserve_mtime = false;
        }
        if let Some(ref log_dir) = self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["photo-organiser", "/camera", "/library"]).unwrap();
        let config = cli.to_config();
        assert_eq!(config.source_dir, PathBuf::from("/camera"));
        assert_eq!(config.target_dir, PathBuf::from("/library"));
        assert_eq!(config.operation, TransferMode::Copy);
        assert!(config.preserve_mtime);
    }

    #[test]
    fn test_flags_override_config_file() {
        let cli = Cli::try_parse_from([
            "photo-organiser",
            "--operation",
            "move",
            "--no-preserve-mtime",
            "/camera",
        ])
        .unwrap();

        let file_config = Config::new("/from-file", "/library-from-file");
        let config = cli.merge_with_config(file_config);
        assert_eq!(config.source_dir, PathBuf::from("/camera"));
        assert_eq!(config.target_dir, PathBuf::from("/library-from-file"));
        assert_eq!(config.operation, TransferMode::Move);
        assert!(!config.preserve_mtime);
    }

    #[test]
    fn test_write_sample_config_needs_no_directories() {
        let cli =
            Cli::try_parse_from(["photo-organiser", "--write-sample-config", "Config/import.toml"])
                .unwrap();
        assert_eq!(
            cli.write_sample_config,
            Some(PathBuf::from("Config/import.toml"))
        );
        assert!(cli.source.is_none());
        assert!(cli.target.is_none());
    }

    #[test]
    fn test_rejects_unknown_operation() {
        let result = Cli::try_parse_from(["photo-organiser", "-O", "symlink", "a", "b"]);
        assert!(result.is_err());
    }
}
