//! Advisory destination-directory lock.
//!
//! Collision resolution and the final rename into a directory must not
//! interleave with another writer picking the same name. We serialize them by
//! holding an exclusive `fs2` lock on a sidecar file `.file_by_date.lock`
//! inside the destination directory. The lock is released and the sidecar
//! removed when the guard drops.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::trace;

use super::util::INTERNAL_PREFIX;

/// RAII guard held while a directory lock is active.
pub struct DirLock {
    file: File,
    path: PathBuf,
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

fn lock_file_path(dir: &Path) -> PathBuf {
    dir.join(format!("{INTERNAL_PREFIX}lock"))
}

/// Acquire an exclusive lock for `dir`, blocking until available.
pub fn acquire_dir_lock(dir: &Path) -> io::Result<DirLock> {
    let path = lock_file_path(dir);
    let start = Instant::now();
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)?;
    FileExt::lock_exclusive(&file)?;
    trace!(path = %path.display(), waited_ms = start.elapsed().as_millis() as u64, "directory lock acquired");
    Ok(DirLock { file, path })
}
