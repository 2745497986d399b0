//! Core configuration types.
//! - RawOptions carries loosely typed user input as gathered by a front end.
//! - Configuration is the validated, immutable plan for one run.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::date_format::DateFormat;
use crate::date_source::DateSource;
use crate::matcher::FileMatcher;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Copy,
    Move,
}

impl Command {
    /// Verb used in user-facing lines ("copy", "move").
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Copy => "copy",
            Command::Move => "move",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Unvalidated option values, one field per recognized option.
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    /// `copy`
    pub copy: bool,
    /// `move`
    pub move_files: bool,
    /// `dp`: strftime-style template
    pub date_pattern: Option<String>,
    /// `ds`: date source selector
    pub date_source: Option<String>,
    /// `fp`: glob over bare file names
    pub file_pattern: Option<String>,
    /// Positional arguments: `<source> <dest>`
    pub args: Vec<String>,
    /// `dry-run`
    pub dry_run: bool,
    /// `links`
    pub follow_links: bool,
    /// `recursive`
    pub recursive: bool,
}

/// Result of splitting the first positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub source_dir: PathBuf,
    /// Set when the argument was a file path with a pattern as its last segment.
    pub file_pattern: Option<String>,
}

/// One configuration defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pick one operation of copy/move")]
    Command,
    #[error("invalid file pattern: {0}")]
    FilePattern(String),
    #[error("invalid date pattern: {0}")]
    DatePattern(String),
    #[error("invalid date source: {0}")]
    DateSource(String),
    #[error("invalid arg count")]
    ArgCount,
    #[error("invalid source directory: {0}")]
    SourceDir(PathBuf),
    #[error("invalid dest directory: {0}")]
    DestDir(PathBuf),
}

/// Every defect found in one validation pass, in check order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.messages().join("; "))]
pub struct ValidationErrors(pub(crate) Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    pub fn contains(&self, err: &ValidationError) -> bool {
        self.0.contains(err)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validated run configuration. Only `validate` can build one.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) command: Command,
    pub(crate) date_source: DateSource,
    pub(crate) date_format: DateFormat,
    pub(crate) matcher: FileMatcher,
    pub(crate) source_dir: PathBuf,
    pub(crate) dest_dir: PathBuf,
    pub(crate) dry_run: bool,
    pub(crate) follow_links: bool,
    pub(crate) recursive: bool,
}

impl Configuration {
    pub fn command(&self) -> Command {
        self.command
    }

    pub fn date_source(&self) -> DateSource {
        self.date_source
    }

    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    pub fn date_pattern(&self) -> &str {
        self.date_format.pattern()
    }

    pub fn matcher(&self) -> &FileMatcher {
        &self.matcher
    }

    /// Effective glob; `None` means every file matches.
    pub fn file_pattern(&self) -> Option<&str> {
        self.matcher.as_str()
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn follow_links(&self) -> bool {
        self.follow_links
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "command      = {}", self.command)?;
        writeln!(f, "date_source  = {}", self.date_source)?;
        writeln!(f, "date_pattern = {}", self.date_pattern())?;
        writeln!(f, "file_pattern = {}", self.file_pattern().unwrap_or("<all>"))?;
        writeln!(f, "dry_run      = {}", self.dry_run)?;
        writeln!(f, "links        = {}", self.follow_links)?;
        writeln!(f, "recursive    = {}", self.recursive)?;
        writeln!(f, "source       = {}", self.source_dir.display())?;
        write!(f, "dest         = {}", self.dest_dir.display())
    }
}
