use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix shared by every transient file this crate creates (temp copies,
/// lock files). The executor never treats such names as input.
pub const INTERNAL_PREFIX: &str = ".file_by_date.";

static SEQ: AtomicU64 = AtomicU64::new(0);

pub fn is_internal_name(name: &OsStr) -> bool {
    name.to_str()
        .is_some_and(|s| s.starts_with(INTERNAL_PREFIX))
}

pub(super) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    dst_dir.join(format!("{INTERNAL_PREFIX}{pid}.{nanos}.{seq}.tmp"))
}

/// EXDEV / ERROR_NOT_SAME_DEVICE. std has no stable ErrorKind for it.
pub(super) fn is_cross_device(e: &io::Error) -> bool {
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EXDEV,
        #[cfg(windows)]
        Some(code) => code == 17,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
pub(super) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
