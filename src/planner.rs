//! Destination planning: `destDir / render(date) / fileName`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Configuration;
use crate::errors::FileByDateError;
use crate::fs_ops::io_error_with_help;

/// Planned location for one source file, before collision resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planned {
    /// Directory the file goes into (may not exist yet).
    pub dir: PathBuf,
    /// Requested file name (the source's own name).
    pub name: OsString,
}

impl Planned {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }
}

pub fn plan_destination(
    cfg: &Configuration,
    src: &Path,
    date: &DateTime<Utc>,
) -> Result<Planned, FileByDateError> {
    let name = src
        .file_name()
        .ok_or_else(|| FileByDateError::NoFileName(src.to_path_buf()))?
        .to_os_string();
    let sub = cfg
        .date_format()
        .render(date)
        .map_err(|_| FileByDateError::DateRender(cfg.date_pattern().to_string()))?;
    Ok(Planned {
        dir: cfg.dest_dir().join(sub),
        name,
    })
}

/// Create `dir` and any missing ancestors. Existing directories are fine.
pub fn ensure_dir_chain(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(io_error_with_help("create destination directory", dir))?;
    Ok(())
}
