//! Whole-file reads and writes, file/directory probes and copying.

pub mod copy;
#[cfg(unix)]
mod metadata;

pub use copy::{copy_file, CopyPrimitives, CopyReport, CopyTier};
#[cfg(unix)]
pub use copy::copy_file_with;

use std::fs::{self, File};
use std::path::Path;

use tracing::trace;

use crate::errors::{OsError, OsResult};
use crate::platform::close_checked;
use crate::transfer::{read_retry, write_retry};

/// Read the whole file into memory.
///
/// The buffer is sized from the file length at open time. If the file shrank
/// since then the result is shorter; bytes appended later are not read.
pub fn read_whole_file(path: &Path) -> OsResult<Vec<u8>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let len = usize::try_from(len).map_err(|_| OsError::OutOfMemory)?;

    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, 0);

    let read = read_retry(&mut file, &mut buf);
    read.status?;
    buf.truncate(read.moved);
    trace!(path = %path.display(), bytes = buf.len(), "read file");
    Ok(buf)
}

/// [`read_whole_file`] decoded as UTF-8; invalid sequences become U+FFFD.
pub fn read_text_file(path: &Path) -> OsResult<String> {
    let bytes = read_whole_file(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Create or truncate `path` and write `contents` in full.
pub fn write_whole_file(path: &Path, contents: &[u8]) -> OsResult<()> {
    let mut file = File::create(path)?;
    write_retry(&mut file, contents).into_result()?;
    close_checked(file)?;
    trace!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// True if `path` exists and is a directory (symlinks followed).
pub fn is_directory(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// True if `path` exists and is a regular file (symlinks followed).
pub fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
