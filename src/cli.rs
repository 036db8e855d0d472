//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Flags override values loaded from config.xml.

use clap::{Parser, Subcommand, ValueHint};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::{parse_mode, Config, LogLevel};

/// Inspect and exercise the osrt operating-system services layer.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Operating-system services layer: file, directory, path and process probes")]
pub struct Args {
    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Also append logs to this file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath, help = "Also write logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Print where osrt will look for the config file (or OSRT_CONFIG if set), then exit.
    #[arg(long, help = "Print the config file location used by osrt and exit")]
    pub print_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a file's contents to stdout.
    Cat {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
    /// Create or truncate a file with the given text (or stdin).
    Write {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        #[arg(long, help = "Contents to write; stdin is used when absent")]
        text: Option<String>,
    },
    /// List directory entries (OS order, without . and ..).
    Ls {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
    },
    /// Copy a file, keeping its permission bits.
    Cp {
        #[arg(value_hint = ValueHint::FilePath)]
        src: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        dst: PathBuf,
        #[arg(long, help = "Copy access and modification times too")]
        preserve_timestamps: bool,
    },
    /// Create a directory and any missing parents.
    Mkdir {
        #[arg(value_hint = ValueHint::DirPath)]
        path: PathBuf,
        #[arg(long, value_name = "OCTAL", value_parser = parse_mode_arg, help = "Mode for new directories, e.g. 750")]
        mode: Option<u32>,
    },
    /// Print the canonical form of a path.
    Realpath {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },
    /// Find an executable on PATH.
    Which { name: OsString },
    /// Print the path of the running executable.
    AppPath,
    /// Print the environment, one NAME=value per line.
    Env,
    /// Print the process arguments, one per line.
    #[command(name = "args")]
    ShowArgs {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        rest: Vec<OsString>,
    },
    /// Print host facts (kernel, arch, separators, limits, directories).
    Info,
    /// Run a shell command and exit with its status.
    Run {
        cmd: String,
        #[arg(long, help = "Capture stdout and print it after the command exits")]
        capture: bool,
    },
    /// Write a commented template config file.
    InitConfig,
}

fn parse_mode_arg(s: &str) -> Result<u32, String> {
    parse_mode(s).ok_or_else(|| format!("invalid octal mode: '{s}'"))
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(f) = &self.log_file {
            cfg.log_file = Some(f.clone());
        }
        match &self.command {
            Some(Command::Cp {
                preserve_timestamps: true,
                ..
            }) => cfg.preserve_timestamps = true,
            Some(Command::Mkdir { mode: Some(m), .. }) => cfg.dir_mode = Some(*m),
            _ => {}
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
