//! Safe copy-and-rename:
//! - Copies to a temp file in the destination directory (fsynced)
//! - Preserves times and permissions on the temp file
//! - Atomically renames temp -> dest, so readers and crashes only ever see
//!   the complete file or nothing

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;

use super::atomic::try_atomic_move;
use super::helpers::io_error_with_help;
use super::metadata::preserve_metadata;
use super::{io_copy, util};

/// Copy `src` to `dest` through a temp sibling. `dest` must be free; callers
/// choose it under the directory lock.
pub fn safe_copy_and_rename(src: &Path, dest: &Path) -> Result<()> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;
    let src_meta = fs::metadata(src).map_err(io_error_with_help("stat source", src))?;

    let tmp_path = util::unique_temp_path(dest_dir);
    if let Err(e) = io_copy::copy_streaming(src, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error_with_help("copy to temporary file", &tmp_path)(e));
    }
    preserve_metadata(&tmp_path, &src_meta);

    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| {
            format!(
                "rename temporary file '{}' -> '{}'",
                tmp_path.display(),
                dest.display()
            )
        });
    }
    Ok(())
}
