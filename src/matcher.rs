//! Glob matching over bare file names.

use glob::{MatchOptions, Pattern, PatternError};
use std::ffi::OsStr;

#[derive(Debug, Clone)]
pub struct FileMatcher {
    pattern: Option<Pattern>,
}

impl FileMatcher {
    /// Compile `pattern`. `None` or an empty string matches every file.
    pub fn new(pattern: Option<&str>) -> Result<Self, PatternError> {
        let pattern = match pattern.map(str::trim) {
            None | Some("") => None,
            Some(p) => Some(Pattern::new(p)?),
        };
        Ok(Self { pattern })
    }

    /// The compiled pattern text, if any.
    pub fn as_str(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::as_str)
    }

    /// Test a bare file name (no directory components).
    pub fn matches(&self, name: &OsStr) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        let opts = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        pattern.matches_with(&name.to_string_lossy(), opts)
    }
}
