//! Error types for the photo organiser

use crate::report::FailureKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo organiser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the photo organiser
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No capture date available for {path}: {message}")]
    MetadataUnavailable { path: PathBuf, message: String },

    #[error("Invalid {component} value {value}, expected {min}..={max}")]
    InvalidDateComponent {
        component: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Copy of {path} was incomplete: wrote {written} of {expected} bytes")]
    IncompleteCopy {
        path: PathBuf,
        written: u64,
        expected: u64,
    },

    #[error("Destination already exists: {path}")]
    Collision { path: PathBuf },

    #[error("Source directory does not exist: {0}")]
    SourceNotFound(PathBuf),

    #[error("Source is not a directory: {0}")]
    SourceNotDirectory(PathBuf),

    #[error("Target is not a directory: {0}")]
    TargetNotDirectory(PathBuf),

    #[error("Target {target} is inside source {source_dir}")]
    TargetInsideSource { target: PathBuf, source_dir: PathBuf },

    #[error("Invalid source filename: {0}")]
    InvalidFileName(PathBuf),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

impl Error {
    /// Classify an error that ended the processing of a single file
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::MetadataUnavailable { .. } => FailureKind::MetadataUnavailable,
            Error::InvalidDateComponent { .. } => FailureKind::InvalidDateComponent,
            _ => FailureKind::IoFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind() {
        let err = Error::MetadataUnavailable {
            path: PathBuf::from("a.jpg"),
            message: "no EXIF".into(),
        };
        assert_eq!(err.failure_kind(), FailureKind::MetadataUnavailable);

        let err = Error::InvalidDateComponent {
            component: "day",
            value: 32,
            min: 1,
            max: 31,
        };
        assert_eq!(err.failure_kind(), FailureKind::InvalidDateComponent);
        assert_eq!(err.to_string(), "Invalid day value 32, expected 1..=31");

        let err = Error::Io(std::io::Error::other("disk full"));
        assert_eq!(err.failure_kind(), FailureKind::IoFailure);
    }
}
