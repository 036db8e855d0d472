//! Status taxonomy for every OS service in this crate.
//!
//! Primitives never panic or raise; they return `OsResult<T>`. Each variant maps
//! to an errno-equivalent code so callers on the runtime side can branch on the
//! same numbers the C library would have produced. `Interrupted`/`WouldBlock`
//! are retried internally and have no variant here.

use std::io;
use std::path::Path;
use thiserror::Error;

pub type OsResult<T> = Result<T, OsError>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OsError {
    #[error("no such file or directory")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("not a directory")]
    NotADirectory,

    #[error("already exists")]
    AlreadyExists,

    #[error("out of memory")]
    OutOfMemory,

    #[error("invalid argument")]
    InvalidArgument,

    /// Any other OS failure, carrying the raw code. Zero-progress writes use `EIO`.
    #[error("i/o error [os code: {0}]")]
    Io(i32),
}

impl OsError {
    /// Generic I/O failure (`EIO`).
    pub const fn io() -> Self {
        OsError::Io(libc::EIO)
    }

    /// Errno-equivalent code for this status.
    pub fn code(&self) -> i32 {
        match self {
            OsError::NotFound => libc::ENOENT,
            OsError::PermissionDenied => libc::EACCES,
            OsError::NotADirectory => libc::ENOTDIR,
            OsError::AlreadyExists => libc::EEXIST,
            OsError::OutOfMemory => libc::ENOMEM,
            OsError::InvalidArgument => libc::EINVAL,
            OsError::Io(code) => *code,
        }
    }

    /// Inverse of [`OsError::code`] for errno values.
    pub fn from_code(code: i32) -> Self {
        match code {
            libc::ENOENT => OsError::NotFound,
            libc::EACCES | libc::EPERM => OsError::PermissionDenied,
            libc::ENOTDIR => OsError::NotADirectory,
            libc::EEXIST => OsError::AlreadyExists,
            libc::ENOMEM => OsError::OutOfMemory,
            libc::EINVAL => OsError::InvalidArgument,
            other => OsError::Io(other),
        }
    }

    /// True for the two failure kinds the retry loops absorb.
    pub fn is_transient(err: &io::Error) -> bool {
        matches!(
            err.kind(),
            io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
        )
    }

    /// Short actionable hint for user-facing messages.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            OsError::NotFound => Some("path not found; verify it exists"),
            OsError::PermissionDenied => {
                Some("permission denied; check ownership and access permissions")
            }
            OsError::NotADirectory => Some("a path component is not a directory"),
            OsError::AlreadyExists => Some("already exists; remove or choose another name"),
            OsError::OutOfMemory => Some("allocation failed; the file may be too large"),
            OsError::InvalidArgument => None,
            #[cfg(unix)]
            OsError::Io(code) => match *code {
                libc::ENOSPC => Some("insufficient space on device"),
                libc::EROFS => Some("read-only filesystem; cannot write here"),
                libc::ELOOP => Some("too many symbolic link levels; possible symlink cycle"),
                libc::ENAMETOOLONG => Some("filename or path too long"),
                libc::EMFILE => Some("process file descriptor limit reached"),
                libc::EISDIR => Some("path is a directory"),
                libc::EXDEV => Some("cross-filesystem operation not possible"),
                _ => None,
            },
            #[cfg(not(unix))]
            OsError::Io(_) => None,
        }
    }
}

impl From<io::Error> for OsError {
    fn from(e: io::Error) -> Self {
        #[cfg(unix)]
        if let Some(code) = e.raw_os_error() {
            return OsError::from_code(code);
        }
        match e.kind() {
            io::ErrorKind::NotFound => OsError::NotFound,
            io::ErrorKind::PermissionDenied => OsError::PermissionDenied,
            io::ErrorKind::NotADirectory => OsError::NotADirectory,
            io::ErrorKind::AlreadyExists => OsError::AlreadyExists,
            io::ErrorKind::OutOfMemory => OsError::OutOfMemory,
            io::ErrorKind::InvalidInput => OsError::InvalidArgument,
            _ => OsError::Io(e.raw_os_error().unwrap_or(libc::EIO)),
        }
    }
}

impl From<std::collections::TryReserveError> for OsError {
    fn from(_: std::collections::TryReserveError) -> Self {
        OsError::OutOfMemory
    }
}

impl From<OsError> for io::Error {
    fn from(e: OsError) -> Self {
        #[cfg(unix)]
        {
            io::Error::from_raw_os_error(e.code())
        }
        #[cfg(not(unix))]
        {
            let kind = match e {
                OsError::NotFound => io::ErrorKind::NotFound,
                OsError::PermissionDenied => io::ErrorKind::PermissionDenied,
                OsError::NotADirectory => io::ErrorKind::NotADirectory,
                OsError::AlreadyExists => io::ErrorKind::AlreadyExists,
                OsError::OutOfMemory => io::ErrorKind::OutOfMemory,
                OsError::InvalidArgument => io::ErrorKind::InvalidInput,
                OsError::Io(_) => io::ErrorKind::Other,
            };
            io::Error::new(kind, e)
        }
    }
}

/// Adapter for `map_err` in `anyhow` code paths: keeps the `OsError` as the
/// source and adds `"<op> '<path>' (<hint>)"` as context.
///
///   read_whole_file(p).map_err(os_error_with_help("read file", p))?;
pub fn os_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(OsError) -> anyhow::Error + 'a {
    os_error_with_context(format!("{} '{}'", op, path.display()))
}

/// Like [`os_error_with_help`] for operations that name more than one path.
pub fn os_error_with_context(what: String) -> impl FnOnce(OsError) -> anyhow::Error {
    move |e| {
        let mut ctx = what;
        if let Some(h) = e.hint() {
            ctx.push_str(&format!(" ({h})"));
        }
        anyhow::Error::new(e).context(ctx)
    }
}

/// `0` for success, otherwise the errno-equivalent code.
pub fn status_code(status: &OsResult<()>) -> i32 {
    match status {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}
