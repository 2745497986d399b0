//! Configuration: raw option types, validation, and the optional XML
//! defaults file.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, path_has_symlink_ancestor};
pub use types::{
    Command, Configuration, LogLevel, RawOptions, SourceSpec, ValidationError, ValidationErrors,
};
pub use validate::{split_source_arg, validate};
pub use xml::{Defaults, create_template_config, load_defaults, load_defaults_from_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FILE_BY_DATE_CONFIG";
/// Built-in date pattern when neither the CLI nor the config file sets one.
pub const DEFAULT_DATE_PATTERN: &str = "%Y/%m";
/// Built-in date source when neither the CLI nor the config file sets one.
pub const DEFAULT_DATE_SOURCE: &str = "modified";
