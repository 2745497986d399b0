//! Copy or move one file into a destination directory.
//!
//! Under the destination directory lock: pick a free name (" (n)" suffix on
//! collision), then copy through a temp file or rename. A move that cannot be
//! renamed (cross-device, or any other rename failure) falls back to copy +
//! remove of the source. A symlink source is always copied by content and the
//! link removed, so the destination never holds a link. If the source cannot
//! be removed after the copy, the copy is taken back out of the destination.

use anyhow::Result;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Command;
use crate::errors::FileByDateError;
use crate::shutdown;

use super::atomic::try_atomic_move;
use super::copy::safe_copy_and_rename;
use super::duplicate::resolve_destination;
use super::helpers::io_error_with_help;
use super::lock::acquire_dir_lock;
use super::util::is_cross_device;

/// Where a file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transferred {
    pub dest: PathBuf,
    /// True when the requested name was taken and a suffix was added.
    pub renamed: bool,
}

/// A failed transfer, with the destination that was chosen if it got that far.
#[derive(Debug, Error)]
#[error("{error:#}")]
pub struct TransferError {
    pub dest: Option<PathBuf>,
    pub error: anyhow::Error,
}

impl TransferError {
    fn new(dest: Option<&Path>, error: impl Into<anyhow::Error>) -> Self {
        Self {
            dest: dest.map(Path::to_path_buf),
            error: error.into(),
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(
            self.error.downcast_ref::<FileByDateError>(),
            Some(FileByDateError::Interrupted)
        )
    }
}

/// Copy or move `src` into `dest_dir` under `name`. `dest_dir` must exist.
pub fn transfer(
    command: Command,
    src: &Path,
    dest_dir: &Path,
    name: &OsStr,
) -> Result<Transferred, TransferError> {
    let _lock = acquire_dir_lock(dest_dir)
        .map_err(io_error_with_help("lock destination directory", dest_dir))
        .map_err(|e| TransferError::new(None, e))?;

    let dest = resolve_destination(dest_dir, name).map_err(|e| TransferError::new(None, e))?;
    let renamed = dest.file_name() != Some(name);

    if shutdown::is_requested() {
        return Err(TransferError::new(Some(&dest), FileByDateError::Interrupted));
    }

    let result = match command {
        Command::Copy => safe_copy_and_rename(src, &dest),
        Command::Move => move_file(src, &dest),
    };
    result.map_err(|e| TransferError::new(Some(&dest), e))?;
    Ok(Transferred { dest, renamed })
}

fn move_file(src: &Path, dest: &Path) -> Result<()> {
    let is_link = fs::symlink_metadata(src)
        .map_err(io_error_with_help("stat source", src))?
        .file_type()
        .is_symlink();

    if is_link {
        debug!(src = %src.display(), "source is a symlink, copying its target");
    } else {
        let err = match try_atomic_move(src, dest) {
            Ok(()) => {
                debug!(src = %src.display(), dest = %dest.display(), "renamed file atomically");
                return Ok(());
            }
            Err(e) => e,
        };
        let hint = match err.downcast_ref::<std::io::Error>() {
            Some(ioe) if is_cross_device(ioe) => "cross-filesystem; will copy instead",
            _ => "falling back to copy",
        };
        warn!(error = %err, hint, "Atomic rename failed, using safe copy+rename");
    }

    safe_copy_and_rename(src, dest)?;
    if let Err(e) = fs::remove_file(src) {
        let err = io_error_with_help("remove original file", src)(e);
        if let Err(undo) = fs::remove_file(dest) {
            warn!(dest = %dest.display(), error = %undo, "could not remove copy after failed move");
            return Err(err.context(format!("copy left at {}", dest.display())));
        }
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn copy_keeps_source_and_suffixes_on_collision() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.jpg");
        let dest_dir = td.path().join("out");
        fs::create_dir(&dest_dir).unwrap();
        fs::write(&src, b"new").unwrap();
        fs::write(dest_dir.join("a.jpg"), b"old").unwrap();

        let t = transfer(Command::Copy, &src, &dest_dir, OsStr::new("a.jpg")).unwrap();
        assert_eq!(t.dest, dest_dir.join("a (2).jpg"));
        assert!(t.renamed);
        assert!(src.exists());
        assert_eq!(fs::read(dest_dir.join("a.jpg")).unwrap(), b"old");
        assert_eq!(fs::read(&t.dest).unwrap(), b"new");
    }

    #[test]
    #[serial]
    fn move_removes_source() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.jpg");
        let dest_dir = td.path().join("out");
        fs::create_dir(&dest_dir).unwrap();
        fs::write(&src, b"data").unwrap();

        let t = transfer(Command::Move, &src, &dest_dir, OsStr::new("a.jpg")).unwrap();
        assert_eq!(t.dest, dest_dir.join("a.jpg"));
        assert!(!t.renamed);
        assert!(!src.exists());
        assert_eq!(fs::read(&t.dest).unwrap(), b"data");
    }

    #[test]
    #[serial]
    fn no_transient_files_left_behind() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.jpg");
        let dest_dir = td.path().join("out");
        fs::create_dir(&dest_dir).unwrap();
        fs::write(&src, b"data").unwrap();

        transfer(Command::Copy, &src, &dest_dir, OsStr::new("a.jpg")).unwrap();
        let names: Vec<_> = fs::read_dir(&dest_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("a.jpg")]);
    }

    #[test]
    #[serial]
    fn interrupted_transfer_writes_nothing() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.jpg");
        let dest_dir = td.path().join("out");
        fs::create_dir(&dest_dir).unwrap();
        fs::write(&src, b"data").unwrap();

        shutdown::request();
        let err = transfer(Command::Move, &src, &dest_dir, OsStr::new("a.jpg")).unwrap_err();
        shutdown::reset();

        assert!(err.is_interrupted());
        assert!(src.exists());
        assert!(!dest_dir.join("a.jpg").exists());
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn move_of_symlink_copies_target_and_removes_link() {
        let td = tempdir().unwrap();
        let store = td.path().join("store");
        let inbox = td.path().join("inbox");
        let dest_dir = td.path().join("out");
        for d in [&store, &inbox, &dest_dir] {
            fs::create_dir(d).unwrap();
        }
        fs::write(store.join("real.jpg"), b"bytes").unwrap();
        let link = inbox.join("link.jpg");
        std::os::unix::fs::symlink("../store/real.jpg", &link).unwrap();

        let t = transfer(Command::Move, &link, &dest_dir, OsStr::new("link.jpg")).unwrap();

        let meta = fs::symlink_metadata(&t.dest).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(fs::read(&t.dest).unwrap(), b"bytes");
        assert!(fs::symlink_metadata(&link).is_err());
        assert_eq!(fs::read(store.join("real.jpg")).unwrap(), b"bytes");
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn failed_source_removal_takes_the_copy_back() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempdir().unwrap();
        let src_dir = td.path().join("in");
        let dest_dir = td.path().join("out");
        fs::create_dir(&src_dir).unwrap();
        fs::create_dir(&dest_dir).unwrap();
        let target = src_dir.join("real.jpg");
        fs::write(&target, b"data").unwrap();
        let link = src_dir.join("a.jpg");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        fs::set_permissions(&src_dir, fs::Permissions::from_mode(0o500)).unwrap();

        let res = transfer(Command::Move, &link, &dest_dir, OsStr::new("a.jpg"));
        fs::set_permissions(&src_dir, fs::Permissions::from_mode(0o700)).unwrap();

        // Root ignores directory permissions.
        let Err(err) = res else { return };
        assert_eq!(err.dest.as_deref(), Some(dest_dir.join("a.jpg").as_path()));
        assert!(err.to_string().contains("remove original file"), "err={err}");
        assert!(!dest_dir.join("a.jpg").exists());
        assert!(fs::symlink_metadata(&link).is_ok());
    }
}
