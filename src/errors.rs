//! Typed error definitions for file_by_date.
//! Runtime failures that callers may want to match on; validation defects
//! live in `config::types`.

use std::path::PathBuf;
use thiserror::Error;

use crate::date_source::DateSource;

#[derive(Debug, Error)]
pub enum FileByDateError {
    #[error("{date_source} date unavailable for {path}: {reason}")]
    DateUnavailable {
        path: PathBuf,
        date_source: DateSource,
        reason: String,
    },

    #[error("source directory vanished: {0}")]
    SourceVanished(PathBuf),

    #[error("cannot render date pattern '{0}'")]
    DateRender(String),

    #[error("source path has no file name: {0}")]
    NoFileName(PathBuf),

    #[error("no free destination name for {name} in {dir}")]
    NoFreeName { dir: PathBuf, name: String },

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl FileByDateError {
    /// Stable short code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            FileByDateError::DateUnavailable { .. } => "date_unavailable",
            FileByDateError::SourceVanished(_) => "source_vanished",
            FileByDateError::DateRender(_) => "date_render",
            FileByDateError::NoFileName(_) => "no_file_name",
            FileByDateError::NoFreeName { .. } => "no_free_name",
            FileByDateError::Interrupted => "interrupted",
        }
    }
}
