//! Configuration for the `osrt` tool.
//! XML file on disk, overridden by command-line flags.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor, CONFIG_ENV};
pub use types::{Config, LogLevel};
pub use xml::{
    create_template_config, load_config, load_config_from_xml_path, parse_mode, LoadedConfig,
};
