//! Core library for `file_by_date`.
//!
//! Copies or moves files from a source directory into a destination tree
//! organized by each file's date. The flow is two-phase:
//!
//! 1. [`validate`] turns loosely typed [`RawOptions`] into an immutable
//!    [`Configuration`], collecting every defect into [`ValidationErrors`].
//! 2. [`execute`] walks the source, plans each destination and performs the
//!    copy/move, reporting one [`OperationResult`] per matched file.

pub mod config;
pub mod date_format;
pub mod date_source;
pub mod errors;
pub mod executor;
pub mod fs_ops;
pub mod matcher;
pub mod output;
pub mod planner;
pub mod platform;
pub mod shutdown;

pub use config::{
    Command, Configuration, LogLevel, RawOptions, SourceSpec, ValidationError, ValidationErrors,
    default_config_path, path_has_symlink_ancestor, split_source_arg, validate,
};
pub use date_format::DateFormat;
pub use date_source::DateSource;
pub use errors::FileByDateError;
pub use executor::{OperationResult, Outcome, RunSummary, execute};
pub use matcher::FileMatcher;
pub use planner::{Planned, ensure_dir_chain, plan_destination};
