//! Option validation.
//! Every check runs on every call and appends to one accumulator, so a single
//! pass reports all defects. A Configuration is only produced when the
//! accumulator is empty.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::date_format::DateFormat;
use crate::date_source::DateSource;
use crate::matcher::FileMatcher;

use super::types::{Command, Configuration, RawOptions, SourceSpec, ValidationError, ValidationErrors};

const NONE_MARKER: &str = "<none>";

/// Validate raw option values into an immutable Configuration.
///
/// Check order (and therefore error order): command, file pattern, date
/// pattern, date source, positional arguments, source directory, destination
/// directory.
pub fn validate(raw: RawOptions) -> Result<Configuration, ValidationErrors> {
    let mut errors: Vec<ValidationError> = Vec::new();

    let command = match (raw.copy, raw.move_files) {
        (true, false) => Some(Command::Copy),
        (false, true) => Some(Command::Move),
        _ => {
            errors.push(ValidationError::Command);
            None
        }
    };

    // The positional split runs first: a file-with-pattern argument overrides `fp`.
    let mut file_pattern = raw.file_pattern;
    let positional = if let [source, dest] = raw.args.as_slice() {
        let spec = split_source_arg(source);
        if spec.file_pattern.is_some() {
            file_pattern = spec.file_pattern;
        }
        Some((spec.source_dir, PathBuf::from(dest)))
    } else {
        None
    };

    let matcher = match FileMatcher::new(file_pattern.as_deref()) {
        Ok(m) => Some(m),
        Err(e) => {
            debug!(pattern = ?file_pattern, error = %e, "file pattern rejected");
            errors.push(ValidationError::FilePattern(
                file_pattern.clone().unwrap_or_default(),
            ));
            None
        }
    };

    let date_format = match raw.date_pattern.as_deref() {
        Some(p) => match DateFormat::compile(p) {
            Ok(f) => Some(f),
            Err(e) => {
                debug!(pattern = p, error = %e, "date pattern rejected");
                errors.push(ValidationError::DatePattern(p.to_string()));
                None
            }
        },
        None => {
            errors.push(ValidationError::DatePattern(NONE_MARKER.into()));
            None
        }
    };

    let date_source = match raw.date_source.as_deref() {
        Some(s) => {
            let parsed = DateSource::parse(s);
            if parsed.is_none() {
                errors.push(ValidationError::DateSource(s.to_string()));
            }
            parsed
        }
        None => {
            errors.push(ValidationError::DateSource(NONE_MARKER.into()));
            None
        }
    };

    let (source_dir, dest_dir) = match positional {
        Some((source, dest)) => {
            let source_dir = existing_dir(&source);
            if source_dir.is_none() {
                errors.push(ValidationError::SourceDir(source));
            }
            let dest_dir = existing_dir(&dest);
            if dest_dir.is_none() {
                errors.push(ValidationError::DestDir(dest));
            }
            (source_dir, dest_dir)
        }
        None => {
            errors.push(ValidationError::ArgCount);
            (None, None)
        }
    };

    match (command, matcher, date_format, date_source, source_dir, dest_dir) {
        (
            Some(command),
            Some(matcher),
            Some(date_format),
            Some(date_source),
            Some(source_dir),
            Some(dest_dir),
        ) if errors.is_empty() => {
            let cfg = Configuration {
                command,
                date_source,
                date_format,
                matcher,
                source_dir,
                dest_dir,
                dry_run: raw.dry_run,
                follow_links: raw.follow_links,
                recursive: raw.recursive,
            };
            debug!("Configuration validated:\n{cfg}");
            Ok(cfg)
        }
        _ => {
            for e in &errors {
                debug!(error = %e, "validation defect");
            }
            Err(ValidationErrors(errors))
        }
    }
}

/// Split the first positional argument into a source directory and an
/// optional file pattern.
///
/// - An existing directory (or any argument ending in a separator) is the
///   source directory itself, with no pattern.
/// - Otherwise the parent becomes the source directory (`.` when there is no
///   parent component) and the final segment becomes the pattern.
///
/// A directory whose name looks like a glob (`shots[1]`) is always taken as a
/// directory while it exists.
pub fn split_source_arg(arg: &str) -> SourceSpec {
    let path = Path::new(arg);
    if path.is_dir() || arg.ends_with(std::path::is_separator) {
        return SourceSpec {
            source_dir: path.to_path_buf(),
            file_pattern: None,
        };
    }

    let file_pattern = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    let source_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    SourceSpec {
        source_dir,
        file_pattern,
    }
}

/// Canonical form of `path` if it is an existing directory.
fn existing_dir(path: &Path) -> Option<PathBuf> {
    if !path.is_dir() {
        return None;
    }
    Some(dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()))
}
