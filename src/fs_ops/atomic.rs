//! Atomic rename helper.
//! - Performs a rename with context-rich errors.
//! - On Unix, best-effort fsync of the destination directory after rename.
//!
//! Callers pick a free destination under the directory lock first; this
//! helper never removes an existing destination.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub(super) fn try_atomic_move(src: &Path, dst: &Path) -> Result<()> {
    fs::rename(src, dst)
        .with_context(|| format!("atomic rename '{}' -> '{}'", src.display(), dst.display()))?;

    // Ignore fsync errors to avoid turning a successful rename into a failure.
    if let Some(parent) = dst.parent() {
        let _ = super::util::fsync_dir(parent);
    }
    Ok(())
}
