//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Writes a commented template on request (`osrt init-config`).
//!
//! Unknown elements are a hard error so typos surface early. A file that is
//! not well-formed is reported as a warning and defaults are used.

use anyhow::{bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::platform::write_config_secure_new_0600;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
    #[serde(rename = "preserve_timestamps")]
    preserve_timestamps: Option<bool>,
    /// Octal permission bits, e.g. `750` or `0o750`.
    #[serde(rename = "dir_mode")]
    dir_mode: Option<String>,
}

/// Config plus where it came from and anything worth telling the user.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the values were read from; `None` when defaults were used.
    pub source: Option<PathBuf>,
    /// Non-fatal problems, to be logged once logging is up.
    pub warnings: Vec<String>,
}

/// Parse an octal mode string (`755`, `0755`, `0o755`). At most `0o7777`.
pub fn parse_mode(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s.strip_prefix("0o").unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 8).ok().filter(|m| *m <= 0o7777)
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// Map XmlConfig -> Config, collecting warnings for values we could not use.
fn xml_to_config(parsed: XmlConfig, path: &Path, warnings: &mut Vec<String>) -> Config {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        match s.parse::<LogLevel>() {
            Ok(level) => cfg.log_level = level,
            Err(e) => warnings.push(format!("{}: {e}; using '{}'", path.display(), cfg.log_level)),
        }
    }
    cfg.log_file = non_empty(parsed.log_file.as_deref()).map(PathBuf::from);
    cfg.preserve_timestamps = parsed.preserve_timestamps.unwrap_or(false);
    if let Some(s) = non_empty(parsed.dir_mode.as_deref()) {
        match parse_mode(s) {
            Some(m) => cfg.dir_mode = Some(m),
            None => warnings.push(format!(
                "{}: invalid dir_mode '{s}' (expected octal such as 755); using default",
                path.display()
            )),
        }
    }
    cfg
}

/// Load a Config from a specific XML file path. Any parse error is returned.
pub fn load_config_from_xml_path(path: &Path) -> Result<LoadedConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    let mut warnings = Vec::new();
    let config = xml_to_config(parsed, path, &mut warnings);
    Ok(LoadedConfig {
        config,
        source: Some(path.to_path_buf()),
        warnings,
    })
}

/// Load the config from `$OSRT_CONFIG` or the default location.
///
/// A missing file gives defaults. Unknown elements are an error; any other
/// parse failure gives defaults plus a warning.
pub fn load_config() -> Result<LoadedConfig> {
    let Some(path) = default_config_path() else {
        return Ok(LoadedConfig::default());
    };
    load_config_lenient(&path)
}

fn load_config_lenient(path: &Path) -> Result<LoadedConfig> {
    if !path.exists() {
        return Ok(LoadedConfig::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    match from_xml_str::<XmlConfig>(&contents) {
        Ok(parsed) => {
            let mut warnings = Vec::new();
            let config = xml_to_config(parsed, path, &mut warnings);
            Ok(LoadedConfig {
                config,
                source: Some(path.to_path_buf()),
                warnings,
            })
        }
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("unknown field") {
                bail!("Unknown field in osrt config {}: {}", path.display(), msg);
            }
            Ok(LoadedConfig {
                config: Config::default(),
                source: None,
                warnings: vec![format!(
                    "ignoring malformed config {}: {msg}",
                    path.display()
                )],
            })
        }
    }
}

/// Text of the commented template written by `init-config`.
pub fn template_xml() -> String {
    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "/path/to/osrt.log".into());
    format!(
        "<!--\n  osrt configuration (XML)\n\n  Fields:\n    log_level            -> quiet | normal | info | debug\n    log_file             -> optional log file, e.g. {suggested_log}\n    preserve_timestamps  -> default for `osrt cp` (true/false)\n    dir_mode             -> octal mode for `osrt mkdir`, e.g. 755\n\n  CLI flags override XML values. Set OSRT_CONFIG to use another file.\n-->\n<config>\n  <log_level>normal</log_level>\n  <log_file></log_file>\n  <preserve_timestamps>false</preserve_timestamps>\n  <dir_mode>755</dir_mode>\n</config>\n"
    )
}

/// Write the template to `path` (0600, atomic). Refuses to overwrite an
/// existing file or to write beneath a symlinked directory.
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
    write_config_secure_new_0600(path, template_xml().as_bytes())?;
    info!(path = %path.display(), "Created template config");
    Ok(())
}
