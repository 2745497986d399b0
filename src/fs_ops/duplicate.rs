//! Collision resolution.
//!
//! A planned destination that is already taken gets a " (n)" suffix before
//! the extension, with n = 2, 3, ... until a free name is found. Existing
//! files are never overwritten.
//!
//! This only decides the name from the current state; real runs call it
//! while holding the destination directory lock.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::trace;

use super::util::is_internal_name;
use crate::errors::FileByDateError;

const MAX_TRIES: u64 = 10_000;

#[cfg(windows)]
const MAX_FILENAME_LEN: usize = 240;
#[cfg(not(windows))]
const MAX_FILENAME_LEN: usize = 255;

/// Pick a free name for `name` inside `dst_dir`, checking the filesystem.
pub fn resolve_destination(dst_dir: &Path, name: &OsStr) -> Result<PathBuf, FileByDateError> {
    resolve_destination_with(dst_dir, name, |p| p.exists())
}

/// Pick a free name for `name` inside `dst_dir`, using `is_taken` to decide
/// occupancy. Dry runs pass a predicate that also counts names planned
/// earlier in the same run.
pub fn resolve_destination_with(
    dst_dir: &Path,
    name: &OsStr,
    is_taken: impl Fn(&Path) -> bool,
) -> Result<PathBuf, FileByDateError> {
    let candidate = dst_dir.join(name);
    if is_internal_name(name) || !is_taken(&candidate) {
        return Ok(candidate);
    }

    let base = Path::new(name);
    let stem: OsString = base
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| name.to_os_string());
    let ext: Option<OsString> = base.extension().map(|e| e.to_os_string());

    let mut n: u64 = 2;
    loop {
        let new_name = build_name_with_suffix(&stem, ext.as_deref(), &format!(" ({n})"));
        let candidate = dst_dir.join(&new_name);
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
        if n == 4 {
            trace!(name = ?name, dir = %dst_dir.display(), "duplicate: multiple collisions, still searching");
        }
        if n >= MAX_TRIES {
            let final_name = dst_dir.join(build_name_with_suffix(&stem, ext.as_deref(), " (final)"));
            if is_taken(&final_name) {
                return Err(FileByDateError::NoFreeName {
                    dir: dst_dir.to_path_buf(),
                    name: name.to_string_lossy().into_owned(),
                });
            }
            return Ok(final_name);
        }
        n += 1;
    }
}

#[cfg(unix)]
fn name_len_units(s: &OsStr) -> usize {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().len()
}

#[cfg(not(unix))]
fn name_len_units(s: &OsStr) -> usize {
    s.to_string_lossy().len()
}

/// `stem + suffix + ["." + ext]`, truncating the stem so the result fits
/// within MAX_FILENAME_LEN.
fn build_name_with_suffix(stem: &OsStr, ext: Option<&OsStr>, suffix: &str) -> OsString {
    let mut overhead = suffix.len();
    if let Some(e) = ext {
        overhead += 1 + name_len_units(e);
    }

    let mut stem_os = stem.to_os_string();
    if name_len_units(stem) + overhead > MAX_FILENAME_LEN {
        let budget = MAX_FILENAME_LEN.saturating_sub(overhead).max(1);
        let lossy = stem.to_string_lossy();
        let mut acc = String::new();
        for ch in lossy.chars() {
            if acc.len() + ch.len_utf8() > budget {
                break;
            }
            acc.push(ch);
        }
        if acc.is_empty() {
            acc.push('f');
        }
        stem_os = OsString::from(acc);
    }

    let mut new_name = stem_os;
    new_name.push(suffix);
    if let Some(e) = ext {
        new_name.push(".");
        new_name.push(e);
    }
    new_name
}
