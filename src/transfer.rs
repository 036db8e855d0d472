//! Retry-safe bulk transfer over descriptors.
//!
//! Each loop issues one `read`/`write` call per iteration (for `&File` that is a
//! single syscall), capped to a platform-safe chunk. Transient failures
//! (`EINTR`, `EAGAIN`) re-issue the same chunk; anything else stops the loop and
//! is reported together with the number of bytes already moved.

use std::io::{Read, Write};

use crate::errors::{OsError, OsResult};

/// Largest count handed to a single OS call.
#[cfg(windows)]
pub const MAX_CHUNK: usize = i32::MAX as usize;
#[cfg(not(windows))]
pub const MAX_CHUNK: usize = isize::MAX as usize;

/// Outcome of one retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Bytes actually moved; never more than requested.
    pub moved: usize,
    /// Terminal status.
    pub status: OsResult<()>,
}

impl Transfer {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Collapse into a `Result`, keeping the byte count on success.
    pub fn into_result(self) -> OsResult<usize> {
        self.status.map(|()| self.moved)
    }
}

/// Read up to `buf.len()` bytes. Stops early only at end of input or on a
/// non-retryable error.
pub fn read_retry<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Transfer {
    read_retry_chunked(reader, buf, MAX_CHUNK)
}

/// Write all of `buf`. `moved == buf.len()` if and only if the status is Ok.
pub fn write_retry<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Transfer {
    write_retry_chunked(writer, buf, MAX_CHUNK)
}

pub(crate) fn read_retry_chunked<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    chunk: usize,
) -> Transfer {
    let len = buf.len();
    let mut ofs = 0usize;
    let mut status = Ok(());
    while ofs < len {
        let todo = (len - ofs).min(chunk);
        match reader.read(&mut buf[ofs..ofs + todo]) {
            Ok(0) => break, // eof
            Ok(n) => ofs += n,
            Err(e) if OsError::is_transient(&e) => continue,
            Err(e) => {
                status = Err(OsError::from(e));
                break;
            }
        }
    }
    Transfer { moved: ofs, status }
}

pub(crate) fn write_retry_chunked<W: Write + ?Sized>(
    writer: &mut W,
    buf: &[u8],
    chunk: usize,
) -> Transfer {
    let len = buf.len();
    let mut ofs = 0usize;
    let mut status = Ok(());
    while ofs < len {
        let todo = (len - ofs).min(chunk);
        match writer.write(&buf[ofs..ofs + todo]) {
            // no progress guarantee otherwise
            Ok(0) => {
                status = Err(OsError::io());
                break;
            }
            Ok(n) => ofs += n,
            Err(e) if OsError::is_transient(&e) => continue,
            Err(e) => {
                status = Err(OsError::from(e));
                break;
            }
        }
    }
    debug_assert!(ofs == len || status.is_err());
    Transfer { moved: ofs, status }
}
