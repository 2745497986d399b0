//! Compiled date templates.
//!
//! Templates use chrono's strftime syntax (`%Y/%m` renders `2016/04`).
//! Rendering is pinned to UTC and chrono's built-in English names so the
//! destination layout does not depend on the host timezone or locale.
//! A rendered template is a *relative* path: separators in the template
//! create nested directories, but it may never escape the destination root.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateFormatError {
    #[error("unrecognized format specifier")]
    Syntax,
    #[error("template could not be rendered")]
    Render,
    #[error("rendered path '{0}' escapes the destination directory")]
    Escapes(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    /// Compile `pattern`, rejecting unknown specifiers, templates chrono
    /// cannot render, and templates that render to an absolute path or one
    /// containing `..`.
    pub fn compile(pattern: &str) -> Result<Self, DateFormatError> {
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(DateFormatError::Syntax);
        }
        let fmt = DateFormat {
            pattern: pattern.to_string(),
        };
        // Two-digit month/day/hour so every numeric field is exercised.
        let probe = Utc
            .with_ymd_and_hms(2016, 12, 31, 23, 59, 58)
            .single()
            .ok_or(DateFormatError::Render)?;
        fmt.render(&probe)?;
        Ok(fmt)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render `date` into a relative path. An empty template yields an empty
    /// path (files land directly in the destination root).
    pub fn render(&self, date: &DateTime<Utc>) -> Result<PathBuf, DateFormatError> {
        let mut rendered = String::new();
        write!(rendered, "{}", date.format(&self.pattern)).map_err(|_| DateFormatError::Render)?;

        let mut rel = PathBuf::new();
        for component in Path::new(&rendered).components() {
            match component {
                Component::Normal(seg) => rel.push(seg),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(DateFormatError::Escapes(rendered));
                }
            }
        }
        Ok(rel)
    }
}
