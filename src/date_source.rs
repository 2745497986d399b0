//! Date source strategies.
//! Maps a symbolic selector (`--ds`) to the filesystem timestamp used to
//! place a file in the destination tree.

use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::SystemTime;

use crate::errors::FileByDateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSource {
    /// Last modification time.
    #[default]
    FileModified,
    /// Creation (birth) time. Not every platform/filesystem records it.
    FileCreated,
}

impl DateSource {
    /// Parse a selector case-insensitively. Hyphens and underscores are
    /// interchangeable.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "file_modified" | "modified" | "mtime" => Some(DateSource::FileModified),
            "file_created" | "created" | "birth" | "btime" => Some(DateSource::FileCreated),
            _ => None,
        }
    }

    /// Read this source's timestamp from `path`.
    ///
    /// Symlinks are followed; the executor decides beforehand whether a
    /// symlink is processed at all.
    pub fn resolve(&self, path: &Path) -> Result<DateTime<Utc>, FileByDateError> {
        let unavailable = |reason: String| FileByDateError::DateUnavailable {
            path: path.to_path_buf(),
            date_source: *self,
            reason,
        };
        let meta = fs::metadata(path).map_err(|e| unavailable(e.to_string()))?;
        let time: SystemTime = match self {
            DateSource::FileModified => meta.modified(),
            DateSource::FileCreated => meta.created(),
        }
        .map_err(|e| unavailable(e.to_string()))?;
        Ok(DateTime::<Utc>::from(time))
    }
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DateSource::FileModified => "file_modified",
            DateSource::FileCreated => "file_created",
        };
        f.write_str(s)
    }
}

impl FromStr for DateSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid date source: '{s}'"))
    }
}
