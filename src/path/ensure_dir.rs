//! Create every missing directory along a path.

use std::ffi::OsStr;
use std::fs::DirBuilder;
use std::io;
use std::path::Path;

use tracing::{debug, trace};

use crate::errors::{OsError, OsResult};

/// Mode used for new directories when the caller gives none.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

fn is_separator(b: u8) -> bool {
    b == b'/' || (cfg!(windows) && b == b'\\')
}

/// Prefixes of `path` ending just before each separator, then `path` itself.
/// Empty prefixes (leading `/`, doubled separators) are skipped.
fn prefixes(path: &OsStr) -> Vec<&OsStr> {
    let bytes = path.as_encoded_bytes();
    let mut out = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        if is_separator(b) && i > 0 && !is_separator(bytes[i - 1]) {
            // SAFETY: splitting right before an ASCII separator keeps the
            // encoded bytes on a valid boundary.
            out.push(unsafe { OsStr::from_encoded_bytes_unchecked(&bytes[..i]) });
        }
    }
    if !bytes.is_empty() && !is_separator(bytes[bytes.len() - 1]) {
        out.push(path);
    }
    out
}

fn create_one(dir: &Path, mode: u32) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(dir)
}

/// Ensure `path` and all its parents exist as directories.
///
/// Missing components are created with `mode` (default `0o755`, reduced by the
/// umask). "Already exists" is success for the component being created,
/// including one created concurrently. A file in the middle of the path gives
/// `NotADirectory` from the component below it. Any other failure stops the
/// walk and leaves already-created parents in place.
pub fn ensure_dir(path: &Path, mode: Option<u32>) -> OsResult<()> {
    let mode = mode.unwrap_or(DEFAULT_DIR_MODE);
    if path.as_os_str().is_empty() {
        return Err(OsError::NotFound);
    }
    for prefix in prefixes(path.as_os_str()) {
        let dir = Path::new(prefix);
        if dir.is_dir() {
            continue;
        }
        match create_one(dir, mode) {
            Ok(()) => debug!(path = %dir.display(), mode = format!("{:o}", mode), "created directory"),
            // A non-directory here surfaces from the next component's mkdir.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                trace!(path = %dir.display(), "path appeared concurrently or is not a directory");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
