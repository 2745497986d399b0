//! XML defaults file.
//! - Loads option defaults from config.xml (quick_xml + serde).
//! - Writes a commented template on request (`--init-config`).
//!
//! Notes:
//! - Values only fill in options the command line left unset.
//! - Unknown elements are an error so typos surface instead of being ignored.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::LogLevel;
use super::{DEFAULT_DATE_PATTERN, DEFAULT_DATE_SOURCE};
use crate::platform::{set_dir_mode_0700, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "date_pattern")]
    date_pattern: Option<String>,
    #[serde(rename = "date_source")]
    date_source: Option<String>,
    #[serde(rename = "file_pattern")]
    file_pattern: Option<String>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
}

/// Defaults read from the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    pub date_pattern: Option<String>,
    pub date_source: Option<String>,
    pub file_pattern: Option<String>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn xml_to_defaults(parsed: XmlConfig) -> Defaults {
    Defaults {
        date_pattern: trimmed(parsed.date_pattern),
        date_source: trimmed(parsed.date_source),
        file_pattern: trimmed(parsed.file_pattern),
        // Unrecognized levels fall back to the built-in default.
        log_level: trimmed(parsed.log_level).and_then(|s| LogLevel::parse(&s)),
        log_file: trimmed(parsed.log_file).map(PathBuf::from),
    }
}

/// Load defaults from a specific XML file.
pub fn load_defaults_from_path(path: &Path) -> Result<Defaults> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(xml_to_defaults(parsed))
}

/// Load defaults from the default location (see `default_config_path`).
/// Returns Ok(None) when no location is known or the file does not exist.
pub fn load_defaults() -> Result<Option<(PathBuf, Defaults)>> {
    let Some(path) = default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    let defaults = load_defaults_from_path(&path)?;
    Ok(Some((path, defaults)))
}

/// Create a commented template config at `path`. Fails if it already exists
/// or if an ancestor is a symlink.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
        let _ = set_dir_mode_0700(parent);
    }

    let content = format!(
        "<!--\n  file_by_date configuration (XML)\n\n  All fields are optional defaults; command-line flags win.\n\n    date_pattern  -> strftime template for the destination subpath, e.g. %Y/%m/%d\n    date_source   -> modified | created\n    file_pattern  -> glob over file names, e.g. *.jpg (empty = all files)\n    log_level     -> quiet | normal | info | debug\n    log_file      -> path to an additional log file\n-->\n<config>\n  <date_pattern>{}</date_pattern>\n  <date_source>{}</date_source>\n  <log_level>normal</log_level>\n</config>\n",
        DEFAULT_DATE_PATTERN, DEFAULT_DATE_SOURCE
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    info!("Created template config at {}", path.display());
    Ok(())
}
