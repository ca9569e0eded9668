//! Moving bytes from a source file into the library
//!
//! The destination is opened create-exclusive, so an existing file is never
//! overwritten. A move deletes the source only after the copy has been
//! flushed, synced and its length checked against the source.

use crate::config::TransferMode;
use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const BUFFER_SIZE: usize = 256 * 1024;

/// Deletes a moved source once its copy is in place
pub type RemoveSource = fn(&Path) -> std::io::Result<()>;

/// Default [`RemoveSource`]
pub fn remove_source(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

/// Transfer `source` to `dest`, creating missing parent directories
///
/// Directories created here are removed again if the copy fails, so a failed
/// transfer leaves no empty date folders behind. In [`TransferMode::Move`]
/// the source is handed to `remove` only after the copy is verified; if that
/// fails the copy stays where it is and the error is returned.
pub fn transfer_file(
    source: &Path,
    dest: &Path,
    mode: TransferMode,
    preserve_mtime: bool,
    remove: RemoveSource,
) -> Result<u64> {
    let created = match dest.parent() {
        Some(parent) => create_dir_chain(parent)?,
        None => Vec::new(),
    };

    let written = match copy_verified(source, dest) {
        Ok(written) => written,
        Err(e) => {
            remove_empty_dirs(&created);
            return Err(e);
        }
    };

    if preserve_mtime
        && let Ok(metadata) = fs::metadata(source)
        && let Ok(mtime) = metadata.modified()
    {
        let _ = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime));
    }

    if mode == TransferMode::Move {
        remove(source)?;
        debug!(?source, "Removed source after verified copy");
    }

    Ok(written)
}

/// Copy `source` into a new file at `dest` and check the byte count
///
/// Fails with [`Error::Collision`] if `dest` already exists. A partially
/// written destination is deleted before the error is returned.
pub fn copy_verified(source: &Path, dest: &Path) -> Result<u64> {
    let expected = fs::metadata(source)?.len();
    let src_file = File::open(source)?;

    let dest_file = match OpenOptions::new().write(true).create_new(true).open(dest) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::Collision {
                path: dest.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let outcome = match stream(src_file, dest_file) {
        Ok(written) if written == expected => Ok(written),
        Ok(written) => Err(Error::IncompleteCopy {
            path: source.to_path_buf(),
            written,
            expected,
        }),
        Err(e) => Err(e.into()),
    };

    if outcome.is_err()
        && let Err(e) = fs::remove_file(dest)
    {
        warn!(?dest, error = %e, "Failed to remove partial copy");
    }

    outcome
}

/// Buffered copy that syncs the destination before reporting success
fn stream(src_file: File, dest_file: File) -> std::io::Result<u64> {
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, src_file);
    let mut writer = BufWriter::with_capacity(BUFFER_SIZE, dest_file);

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut written = 0u64;
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
        written += bytes_read as u64;
    }

    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(written)
}

/// `create_dir_all` that reports which directories it created, outermost first
///
/// On failure the directories created so far are removed again.
fn create_dir_chain(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut missing = Vec::new();
    let mut current = Some(dir);
    while let Some(path) = current {
        if path.as_os_str().is_empty() || path.try_exists()? {
            break;
        }
        missing.push(path.to_path_buf());
        current = path.parent();
    }
    missing.reverse();

    let mut created = Vec::with_capacity(missing.len());
    for path in missing {
        match fs::create_dir(&path) {
            Ok(()) => created.push(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => {}
            Err(e) => {
                remove_empty_dirs(&created);
                return Err(e.into());
            }
        }
    }
    Ok(created)
}

/// Remove directories created for a failed transfer, innermost first
fn remove_empty_dirs(created: &[PathBuf]) {
    for dir in created.iter().rev() {
        if fs::remove_dir(dir).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_copy_keeps_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        let dest = dir.path().join("lib/2021/03 - March/05/a.jpg");

        let written = transfer_file(&source, &dest, TransferMode::Copy, true, remove_source).unwrap();

        assert_eq!(written, 10);
        assert_eq!(fs::read(&dest).unwrap(), b"jpeg bytes");
        assert!(source.exists());
    }

    #[test]
    fn test_move_removes_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        let dest = dir.path().join("lib/a.jpg");

        transfer_file(&source, &dest, TransferMode::Move, false, remove_source).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"jpeg bytes");
        assert!(!source.exists());
    }

    #[test]
    fn test_preserves_mtime() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"x").unwrap();
        let mtime = filetime::FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();
        let dest = dir.path().join("out/a.jpg");

        transfer_file(&source, &dest, TransferMode::Copy, true, remove_source).unwrap();

        let copied = filetime::FileTime::from_last_modification_time(&fs::metadata(&dest).unwrap());
        assert_eq!(copied, mtime);
    }

    #[test]
    fn test_existing_destination_is_a_collision() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"new").unwrap();
        let dest = dir.path().join("a-existing.jpg");
        fs::write(&dest, b"old").unwrap();

        let err = transfer_file(&source, &dest, TransferMode::Move, true, remove_source).unwrap_err();

        assert!(matches!(err, Error::Collision { .. }));
        assert_eq!(fs::read(&dest).unwrap(), b"old");
        assert!(source.exists());
    }

    #[test]
    fn test_failed_copy_keeps_source_and_leaves_no_directories() {
        let dir = tempdir().unwrap();
        // Opening a directory succeeds but reading it fails, so the copy
        // breaks after the destination has been created.
        let source = dir.path().join("not-a-file.jpg");
        fs::create_dir(&source).unwrap();
        let lib = dir.path().join("lib");
        let dest = lib.join("2021/03 - March/05/not-a-file.jpg");

        let result = transfer_file(&source, &dest, TransferMode::Move, true, remove_source);

        assert!(result.is_err());
        assert!(source.exists());
        assert!(!dest.exists());
        assert!(!lib.exists());
    }

    #[test]
    fn test_blocked_parent_keeps_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        // A regular file where the year directory should go
        fs::write(dir.path().join("2021"), b"").unwrap();
        let dest = dir.path().join("2021/03 - March/05/a.jpg");

        let result = transfer_file(&source, &dest, TransferMode::Move, true, remove_source);

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(source.exists());
    }

    #[test]
    fn test_create_dir_chain_reports_new_dirs() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a/b/c");
        fs::create_dir(dir.path().join("a")).unwrap();

        let created = create_dir_chain(&target).unwrap();

        assert_eq!(
            created,
            vec![dir.path().join("a/b"), dir.path().join("a/b/c")]
        );
        assert!(target.is_dir());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_create_dir_chain_rolls_back_on_failure() {
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        // `lib` can be created but the oversized name inside it cannot
        let target = lib.join("x".repeat(300));

        assert!(create_dir_chain(&target).is_err());
        assert!(!lib.exists());
    }

    #[test]
    fn test_failed_remove_keeps_copy_and_source() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();
        let dest = dir.path().join("lib/a.jpg");

        let result = transfer_file(&source, &dest, TransferMode::Move, true, |_: &Path| {
            Err(std::io::Error::other("source is busy"))
        });

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"jpeg bytes");
    }
}
