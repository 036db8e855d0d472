//! `osrt`: operating-system services for a managed runtime.
//!
//! Whole-file reads and writes, directory listing, tiered file copy, path
//! resolution and process/environment introspection. Every operation returns
//! an [`OsResult`]; transient interruptions are retried internally.
//!
//! Platform differences live in [`platform`] and are chosen at build time.

pub mod cli;
pub mod config;
pub mod dir;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod path;
pub mod platform;
pub mod process;
pub mod sysinfo;
pub mod transfer;

pub use config::{default_config_path, path_has_symlink_ancestor, Config, LogLevel};
pub use dir::{list_directory, DirCursor, DirListing, GrowthPolicy};
pub use errors::{os_error_with_context, os_error_with_help, status_code, OsError, OsResult};
pub use fs_ops::{
    copy_file, is_directory, is_file, read_text_file, read_whole_file, write_whole_file,
    CopyPrimitives, CopyReport, CopyTier,
};
pub use path::{app_path, app_path_generic, ensure_dir, realpath, search_path, DEFAULT_DIR_MODE};
pub use process::{get_args, get_env, run, run_capture, CommandOutput, EnvPair};
pub use sysinfo::{
    arch_name, dir_separator, home_dir, kernel_name, path_max, path_separator, processor_count,
    temp_dir,
};
pub use transfer::{read_retry, write_retry, Transfer};
