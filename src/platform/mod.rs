//! Platform-specific backends, selected at build time.
//! Each contract (directory cursor, copy primitives, self-path discovery) has
//! exactly one implementation per platform family; the rest of the crate
//! only sees the re-exports below.

#[cfg(unix)]
mod common_unix;
#[cfg(target_os = "macos")]
mod macos;
mod temp;
#[cfg(all(unix, not(target_os = "macos")))]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use common_unix::{
    UnixDirCursor as NativeDirCursor, close_checked, open_log_file_secure_append,
    write_config_secure_new_0600,
};

#[cfg(target_os = "macos")]
pub use macos::{NativeCopy, path_max_uncached, self_exe_path};

#[cfg(all(unix, not(target_os = "macos")))]
pub use unix::{NativeCopy, path_max_uncached, self_exe_path};

#[cfg(not(unix))]
pub use windows::{
    WinDirCursor as NativeDirCursor, close_checked, copy_file_whole,
    open_log_file_secure_append, path_max_uncached, self_exe_path,
    write_config_secure_new_0600,
};
