//! CLI definition and parsing.
//!
//! Notes:
//! - Option names mirror the library's recognized options (`copy`, `move`, `dp`, `ds`, `fp`, ...).
//! - --debug is a shorthand for --log-level debug.
//! - Values left unset here fall back to the XML defaults file, then to built-ins.

use clap::{Parser, ValueHint};
use std::path::PathBuf;
use std::str::FromStr;

use file_by_date::config::{DEFAULT_DATE_PATTERN, DEFAULT_DATE_SOURCE, Defaults};
use file_by_date::{LogLevel, RawOptions};

/// Copy or move files into folders named after their date.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Copy or move files into folders named after their date",
    after_help = "Examples:\n  file_by_date --copy --dp %Y/%m photos/ sorted/\n  file_by_date --move 'photos/*.jpg' sorted/\n  file_by_date --copy --ds created --fp '*.mov' -r camera/ archive/"
)]
pub struct Args {
    /// `<SOURCE> <DEST>`. SOURCE may end in a file pattern, e.g. `photos/*.jpg`.
    #[arg(value_name = "PATH", value_hint = ValueHint::AnyPath)]
    pub paths: Vec<String>,

    /// Copy files (source is left untouched).
    #[arg(long = "copy", visible_alias = "cp")]
    pub copy: bool,

    /// Move files.
    #[arg(long = "move", visible_alias = "mv")]
    pub move_files: bool,

    /// Date pattern for the destination subpath (strftime, e.g. %Y/%m/%d).
    #[arg(long = "dp", value_name = "PATTERN")]
    pub date_pattern: Option<String>,

    /// Date source: modified | created.
    #[arg(long = "ds", value_name = "SOURCE")]
    pub date_source: Option<String>,

    /// Glob over file names, e.g. '*.jpg'. Ignored when SOURCE carries a pattern.
    #[arg(long = "fp", value_name = "GLOB")]
    pub file_pattern: Option<String>,

    /// Report what would happen without touching the filesystem.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Follow symbolic links while walking the source.
    #[arg(short = 'l', long = "links")]
    pub follow_links: bool,

    /// Descend into subdirectories of the source.
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Set log level: quiet, normal, info, debug.
    #[arg(long, value_name = "LEVEL", value_parser = LogLevel::from_str)]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON.
    #[arg(long)]
    pub json: bool,

    /// Print the config file location and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Write a template config file at the config location and exit.
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.clone()
    }

    /// Merge flags over `defaults` into the library's raw option set.
    pub fn to_raw_options(&self, defaults: &Defaults) -> RawOptions {
        RawOptions {
            copy: self.copy,
            move_files: self.move_files,
            date_pattern: self
                .date_pattern
                .clone()
                .or_else(|| defaults.date_pattern.clone())
                .or_else(|| Some(DEFAULT_DATE_PATTERN.to_string())),
            date_source: self
                .date_source
                .clone()
                .or_else(|| defaults.date_source.clone())
                .or_else(|| Some(DEFAULT_DATE_SOURCE.to_string())),
            file_pattern: self
                .file_pattern
                .clone()
                .or_else(|| defaults.file_pattern.clone()),
            args: self.paths.iter().map(|p| sanitize_arg(p)).collect(),
            dry_run: self.dry_run,
            follow_links: self.follow_links,
            recursive: self.recursive,
        }
    }
}

/// Strip one pair of surrounding quotes left behind by Windows shells.
fn sanitize_arg(s: &str) -> String {
    let trimmed = s.trim();
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
    if quoted {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("file_by_date").chain(list.iter().copied())).unwrap()
    }

    #[test]
    fn aliases_set_the_command() {
        assert!(args(&["--cp", "a", "b"]).copy);
        assert!(args(&["--mv", "a", "b"]).move_files);
    }

    #[test]
    fn flags_win_over_defaults() {
        let defaults = Defaults {
            date_pattern: Some("%Y".into()),
            date_source: Some("created".into()),
            file_pattern: Some("*.png".into()),
            ..Default::default()
        };
        let raw = args(&["--copy", "--dp", "%Y/%m/%d", "src", "dst"]).to_raw_options(&defaults);
        assert_eq!(raw.date_pattern.as_deref(), Some("%Y/%m/%d"));
        assert_eq!(raw.date_source.as_deref(), Some("created"));
        assert_eq!(raw.file_pattern.as_deref(), Some("*.png"));
        assert_eq!(raw.args, vec!["src", "dst"]);
    }

    #[test]
    fn built_in_defaults_apply_last() {
        let raw = args(&["--move", "src", "dst"]).to_raw_options(&Defaults::default());
        assert_eq!(raw.date_pattern.as_deref(), Some(DEFAULT_DATE_PATTERN));
        assert_eq!(raw.date_source.as_deref(), Some(DEFAULT_DATE_SOURCE));
        assert!(raw.file_pattern.is_none());
    }

    #[test]
    fn debug_flag_beats_log_level() {
        let a = args(&["-d", "--log-level", "quiet"]);
        assert_eq!(a.effective_log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn log_level_value_is_parsed() {
        let a = args(&["--log-level", "VERBOSE"]);
        assert_eq!(a.effective_log_level(), Some(LogLevel::Info));
        assert_eq!(args(&[]).effective_log_level(), None);
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let res = Args::try_parse_from(["file_by_date", "--log-level", "loud", "a", "b"]);
        assert!(res.is_err());
    }

    #[test]
    fn surrounding_quotes_are_stripped() {
        assert_eq!(sanitize_arg("'photos/*.jpg'"), "photos/*.jpg");
        assert_eq!(sanitize_arg("\"C:\\pics\\\""), "C:\\pics\\");
        assert_eq!(sanitize_arg("plain"), "plain");
        assert_eq!(sanitize_arg("'"), "'");
    }
}
