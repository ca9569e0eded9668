//! Per-file outcomes and the aggregated transfer report

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Classification of a per-file failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No usable capture timestamp in the file
    MetadataUnavailable,
    /// Capture date component out of range
    InvalidDateComponent,
    /// Create, copy or delete failed
    IoFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::MetadataUnavailable => "MetadataUnavailable",
            FailureKind::InvalidDateComponent => "InvalidDateComponent",
            FailureKind::IoFailure => "IOFailure",
        };
        f.write_str(name)
    }
}

/// A file that could not be imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Source file path
    pub path: PathBuf,
    /// Source file name, for display
    pub file_name: String,
    pub kind: FailureKind,
    pub message: String,
}

impl FileFailure {
    pub fn new(path: &Path, kind: FailureKind, message: impl Into<String>) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path: path.to_path_buf(),
            file_name,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Copy failed <{}> : {} {}", self.file_name, self.kind, self.message)
    }
}

/// Terminal state of one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Bytes were written into `destination` (a directory)
    Transferred { destination: PathBuf },
    /// A file with the same name already existed in `destination`
    Skipped { destination: PathBuf },
    /// Date resolution or transfer failed
    Failed(FileFailure),
}

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    pub outcome: FileOutcome,
}

/// Import counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub scanned: usize,
    pub transferred: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportStats {
    pub fn summary(&self) -> String {
        format!(
            "Scanned: {}, Transferred: {}, Skipped: {}, Failed: {}",
            self.scanned, self.transferred, self.skipped, self.failed
        )
    }
}

/// Everything a run produced, built up one file at a time
#[derive(Debug, Default, Clone)]
pub struct TransferReport {
    touched: BTreeSet<PathBuf>,
    failures: Vec<FileFailure>,
    stats: ImportStats,
    cancelled: bool,
}

impl TransferReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's outcome into the report
    pub fn record(&mut self, result: &FileResult) {
        self.stats.scanned += 1;
        match &result.outcome {
            FileOutcome::Transferred { destination } => {
                self.stats.transferred += 1;
                self.touched.insert(destination.clone());
            }
            FileOutcome::Skipped { .. } => self.stats.skipped += 1,
            FileOutcome::Failed(failure) => {
                self.stats.failed += 1;
                self.failures.push(failure.clone());
            }
        }
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// Directories that received at least one file, sorted by rendered path
    pub fn touched_directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.touched.iter().cloned().collect();
        dirs.sort_by_cached_key(|p| p.to_string_lossy().into_owned());
        dirs
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    pub fn stats(&self) -> ImportStats {
        self.stats
    }

    /// Whether the run stopped early on a cancellation request
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// No file failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
