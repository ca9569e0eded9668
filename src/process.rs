//! Import engine
//!
//! Walks the source tree one file at a time:
//! - resolving the capture date
//! - deriving the dated destination directory
//! - skipping files whose destination already exists
//! - copying or moving everything else
//!
//! Every failure is confined to the file that caused it and recorded in the
//! [`TransferReport`].

use crate::capture::CaptureDateResolver;
use crate::config::{CollisionPolicy, Config};
use crate::error::{Error, Result};
use crate::layout::destination_for;
use crate::report::{FileFailure, FileOutcome, FileResult, TransferReport};
use crate::transfer::{RemoveSource, remove_source, transfer_file};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, debug, info, span, warn};
use walkdir::WalkDir;

/// Sorts a source tree into the dated library layout
pub struct ImportEngine<R> {
    config: Config,
    resolver: R,
    cancel: Arc<AtomicBool>,
    remove_source: RemoveSource,
}

impl<R: CaptureDateResolver> ImportEngine<R> {
    /// Create an engine for the given configuration and date resolver
    pub fn new(config: Config, resolver: R) -> Self {
        Self {
            config,
            resolver,
            cancel: Arc::new(AtomicBool::new(false)),
            remove_source,
        }
    }

    /// Share a cancellation flag; once set, the run stops before the next file
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the import
    pub fn run(&self) -> Result<TransferReport> {
        self.run_with(|_| {})
    }

    /// Run the import, handing each file's result to `observer` as it completes
    ///
    /// Returns an error only when the source or target roots themselves are
    /// unusable; nothing is touched in that case.
    pub fn run_with<F>(&self, mut observer: F) -> Result<TransferReport>
    where
        F: FnMut(&FileResult),
    {
        let _span = span!(Level::INFO, "import_run").entered();

        let (source_root, target_root) = self.validate_roots()?;
        info!(
            source = %source_root.display(),
            target = %target_root.display(),
            operation = ?self.config.operation,
            "Importing photos"
        );

        let mut report = TransferReport::new();

        for entry in WalkDir::new(&source_root).follow_links(false) {
            if self.cancel.load(Ordering::Relaxed) {
                warn!("Import cancelled, stopping before the next file");
                report.mark_cancelled();
                break;
            }

            let result = match entry {
                Ok(entry) => {
                    if !is_regular_file(&entry) {
                        continue;
                    }
                    self.import_file(entry.path(), &target_root)
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let err = Error::from(e);
                    warn!(?path, error = %err, "Failed to read source entry");
                    FileResult {
                        outcome: FileOutcome::Failed(FileFailure::new(
                            &path,
                            err.failure_kind(),
                            err.to_string(),
                        )),
                        source: path,
                    }
                }
            };

            observer(&result);
            report.record(&result);
        }

        info!("{}", report.stats().summary());
        Ok(report)
    }

    /// Check the top-level arguments and resolve them to canonical paths
    fn validate_roots(&self) -> Result<(PathBuf, PathBuf)> {
        let source = &self.config.source_dir;
        if !source.try_exists()? {
            return Err(Error::SourceNotFound(source.clone()));
        }
        if !source.is_dir() {
            return Err(Error::SourceNotDirectory(source.clone()));
        }

        let target = &self.config.target_dir;
        if target.try_exists()? && !target.is_dir() {
            return Err(Error::TargetNotDirectory(target.clone()));
        }

        let source_root = fs::canonicalize(source)?;
        let target_root = resolve_root(target)?;
        if target_root.starts_with(&source_root) {
            return Err(Error::TargetInsideSource {
                target: target_root,
                source_dir: source_root,
            });
        }

        Ok((source_root, target_root))
    }

    /// Process one source file; never fails, failures become the outcome
    fn import_file(&self, path: &Path, target_root: &Path) -> FileResult {
        let _file_span = span!(Level::DEBUG, "import_file", ?path).entered();

        let outcome = match self.place_file(path, target_root) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(?path, kind = %e.failure_kind(), error = %e, "Failed to import file");
                FileOutcome::Failed(FileFailure::new(path, e.failure_kind(), e.to_string()))
            }
        };

        FileResult {
            source: path.to_path_buf(),
            outcome,
        }
    }

    fn place_file(&self, path: &Path, target_root: &Path) -> Result<FileOutcome> {
        let date = self.resolver.resolve_capture_date(path)?;
        let destination = destination_for(target_root, &date)?;
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::InvalidFileName(path.to_path_buf()))?;
        let dest_file = destination.join(file_name);

        if dest_file.try_exists()? {
            return Ok(self.on_collision(path, &dest_file, destination));
        }

        match transfer_file(
            path,
            &dest_file,
            self.config.operation,
            self.config.preserve_mtime,
            self.remove_source,
        ) {
            Ok(bytes) => {
                info!(
                    source = ?path,
                    destination = ?dest_file,
                    %date,
                    bytes,
                    "Imported file"
                );
                Ok(FileOutcome::Transferred { destination })
            }
            // Lost a race for the name after the existence check
            Err(Error::Collision { .. }) => Ok(self.on_collision(path, &dest_file, destination)),
            Err(e) => Err(e),
        }
    }

    fn on_collision(&self, path: &Path, dest_file: &Path, destination: PathBuf) -> FileOutcome {
        match self.config.collision_policy {
            CollisionPolicy::SkipExisting => {
                debug!(?path, ?dest_file, "Destination exists, skipping");
                FileOutcome::Skipped { destination }
            }
        }
    }
}

/// Absolute, symlink-free form of a root that may not exist yet
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended with `.` and `..` applied lexically.
fn resolve_root(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;

    for ancestor in absolute.ancestors() {
        if !ancestor.try_exists()? {
            continue;
        }
        let mut resolved = fs::canonicalize(ancestor)?;
        let tail = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
        for component in tail.components() {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => resolved.push(name),
                _ => {}
            }
        }
        return Ok(resolved);
    }

    Ok(absolute)
}

/// Regular files, plus symlinks that point at regular files
fn is_regular_file(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}
