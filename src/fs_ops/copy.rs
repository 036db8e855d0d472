//! Tiered file copy.
//!
//! Tiers, tried in order and never mixed within one copy:
//! 1. whole-file kernel primitive (macOS `fcopyfile`, Windows `CopyFileW`);
//! 2. kernel range copy (Linux `sendfile`);
//! 3. buffered loop over [`read_retry`]/[`write_retry`].
//!
//! A tier is skipped only when the platform reports it unsupported. Tier 1
//! falls through on `ENOTSUP`/`ENOSYS`; tier 2 only on `EINVAL` before any
//! byte has moved. Everything else is terminal.

use std::fs::File;
use std::io::{self, Read, Write};
#[cfg(unix)]
use std::path::Path;

use tracing::trace;
#[cfg(unix)]
use tracing::debug;

use crate::errors::{OsError, OsResult};
use crate::transfer::{read_retry, write_retry};

/// Largest buffer used by the buffered tier.
pub const BUFFER_CAP: usize = 1024 * 1024;

/// Bytes requested per range-copy call.
pub const RANGE_CHUNK: usize = 1 << 30;

/// Kernel copy primitives one platform offers. `None` means "not offered
/// here" and the engine moves on to the next tier.
pub trait CopyPrimitives {
    /// Copy all data from `src` into `dst` in one call.
    fn whole_file(&self, _src: &File, _dst: &File) -> Option<io::Result<()>> {
        None
    }

    /// Copy up to `chunk` bytes from the current offset of `src` to the current
    /// offset of `dst`, advancing both. `Ok(0)` is end of input.
    fn copy_range(&self, _src: &File, _dst: &File, _chunk: usize) -> Option<io::Result<usize>> {
        None
    }
}

/// Which tier produced the destination contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTier {
    WholeFile,
    KernelRange,
    Buffered,
}

impl std::fmt::Display for CopyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CopyTier::WholeFile => "whole-file",
            CopyTier::KernelRange => "kernel-range",
            CopyTier::Buffered => "buffered",
        };
        f.write_str(s)
    }
}

/// Result of a successful [`copy_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    pub tier: CopyTier,
    /// Bytes of content copied.
    pub bytes: u64,
    /// True when source atime/mtime were applied to the destination.
    pub timestamps_preserved: bool,
}

#[cfg(unix)]
fn is_unsupported(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::ENOTSUP) | Some(libc::ENOSYS))
}

#[cfg(not(unix))]
fn is_unsupported(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::Unsupported
}

#[derive(Debug, PartialEq, Eq)]
enum RangeOutcome {
    Done(u64),
    Unsupported,
    Failed(OsError),
}

/// Loop the range primitive until `len` bytes moved or the source ends.
/// At least one call is made, so a zero-length source still probes support.
fn range_copy<P: CopyPrimitives + ?Sized>(
    prims: &P,
    src: &File,
    dst: &File,
    len: u64,
) -> RangeOutcome {
    let mut total: u64 = 0;
    loop {
        let want = (len - total).clamp(1, RANGE_CHUNK as u64) as usize;
        match prims.copy_range(src, dst, want) {
            None => return RangeOutcome::Unsupported,
            Some(Ok(0)) => break,
            Some(Ok(n)) => total += n as u64,
            Some(Err(e)) if OsError::is_transient(&e) => continue,
            Some(Err(e)) => {
                let err = OsError::from(e);
                if total == 0 && err == OsError::InvalidArgument {
                    return RangeOutcome::Unsupported;
                }
                return RangeOutcome::Failed(err);
            }
        }
        if total >= len {
            break;
        }
    }
    RangeOutcome::Done(total)
}

/// Copy up to `len` bytes through a bounded buffer.
///
/// Bytes read before a read error are still written out before the error is
/// returned. An early end of input ends the copy without error.
pub fn buffered_copy<R, W>(src: &mut R, dst: &mut W, len: u64) -> OsResult<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if len == 0 {
        return Ok(0);
    }
    let cap = len.min(BUFFER_CAP as u64) as usize;
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(cap)?;
    buf.resize(cap, 0);

    let mut total: u64 = 0;
    while total < len {
        let want = (len - total).min(cap as u64) as usize;
        let read = read_retry(src, &mut buf[..want]);
        if read.moved > 0 {
            write_retry(dst, &buf[..read.moved]).into_result()?;
            total += read.moved as u64;
        }
        read.status?;
        if read.moved < want {
            break; // source ended early
        }
    }
    Ok(total)
}

/// Move the content of `src` into `dst` using the first tier that applies.
pub fn copy_contents<P: CopyPrimitives + ?Sized>(
    prims: &P,
    src: &File,
    dst: &File,
    len: u64,
) -> OsResult<(CopyTier, u64)> {
    match prims.whole_file(src, dst) {
        None => {}
        Some(Ok(())) => return Ok((CopyTier::WholeFile, len)),
        Some(Err(e)) if is_unsupported(&e) => {
            trace!(error = %e, "whole-file copy unsupported; falling through");
        }
        Some(Err(e)) => return Err(e.into()),
    }

    match range_copy(prims, src, dst, len) {
        RangeOutcome::Done(n) => return Ok((CopyTier::KernelRange, n)),
        RangeOutcome::Failed(e) => return Err(e),
        RangeOutcome::Unsupported => trace!("range copy unsupported; falling through"),
    }

    let mut reader = src;
    let mut writer = dst;
    let n = buffered_copy(&mut reader, &mut writer, len)?;
    Ok((CopyTier::Buffered, n))
}

/// Copy `source` to `dest` with the given primitives.
///
/// The destination is created or truncated and takes the source permission
/// bits. A missing source fails before the destination is touched.
#[cfg(unix)]
pub fn copy_file_with<P: CopyPrimitives + ?Sized>(
    prims: &P,
    source: &Path,
    dest: &Path,
    preserve_timestamps: bool,
) -> OsResult<CopyReport> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    use super::metadata;
    use crate::platform::close_checked;

    let src = File::open(source)?;
    let meta = src.metadata()?;
    let mode = meta.permissions().mode() & 0o7777;
    let dst = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(dest)?;
    metadata::apply_mode(&dst, mode, dest);

    // On error both handles drop here; the content error wins over any close error.
    let (tier, bytes) = copy_contents(prims, &src, &dst, meta.len())?;

    let timestamps_preserved =
        preserve_timestamps && metadata::preserve_timestamps(&dst, &meta, dest);
    drop(src);
    close_checked(dst)?;

    debug!(
        src = %source.display(),
        dst = %dest.display(),
        %tier,
        bytes,
        timestamps_preserved,
        "copied file"
    );
    Ok(CopyReport {
        tier,
        bytes,
        timestamps_preserved,
    })
}

/// Copy `source` to `dest` with the fastest native primitive available.
#[cfg(unix)]
pub fn copy_file(source: &Path, dest: &Path, preserve_timestamps: bool) -> OsResult<CopyReport> {
    copy_file_with(&crate::platform::NativeCopy, source, dest, preserve_timestamps)
}

/// Copy `source` to `dest` with `CopyFileW`, which keeps timestamps itself.
#[cfg(not(unix))]
pub fn copy_file(
    source: &std::path::Path,
    dest: &std::path::Path,
    _preserve_timestamps: bool,
) -> OsResult<CopyReport> {
    let len = std::fs::metadata(source)?.len();
    crate::platform::copy_file_whole(source, dest)?;
    tracing::debug!(src = %source.display(), dst = %dest.display(), bytes = len, "copied file");
    Ok(CopyReport {
        tier: CopyTier::WholeFile,
        bytes: len,
        timestamps_preserved: true,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;

    /// Primitive whose range calls follow a script; `Move(n)` really copies
    /// `n` bytes so the destination content can be checked.
    #[derive(Default)]
    struct Scripted {
        whole: Option<i32>,
        range: Option<RefCell<VecDeque<Step>>>,
        range_calls: RefCell<usize>,
    }

    enum Step {
        Move(usize),
        Fail(i32),
    }

    impl CopyPrimitives for Scripted {
        fn whole_file(&self, _src: &File, _dst: &File) -> Option<io::Result<()>> {
            self.whole.map(|code| Err(io::Error::from_raw_os_error(code)))
        }

        fn copy_range(&self, src: &File, dst: &File, chunk: usize) -> Option<io::Result<usize>> {
            let steps = self.range.as_ref()?;
            *self.range_calls.borrow_mut() += 1;
            match steps.borrow_mut().pop_front() {
                Some(Step::Fail(code)) => Some(Err(io::Error::from_raw_os_error(code))),
                Some(Step::Move(n)) => {
                    let mut buf = vec![0u8; n.min(chunk)];
                    let mut r = src;
                    let got = r.read(&mut buf).unwrap();
                    let mut w = dst;
                    w.write_all(&buf[..got]).unwrap();
                    Some(Ok(got))
                }
                None => Some(Ok(0)),
            }
        }
    }

    fn fixture(content: &[u8]) -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        fs::write(&src, content).unwrap();
        let dst = dir.path().join("dst.bin");
        (dir, src, dst)
    }

    #[test]
    fn no_primitives_uses_buffered_tier() {
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 253) as u8).collect();
        let (_d, src, dst) = fixture(&payload);
        let report = copy_file_with(&Scripted::default(), &src, &dst, false).unwrap();
        assert_eq!(report.tier, CopyTier::Buffered);
        assert_eq!(report.bytes, payload.len() as u64);
        assert_eq!(fs::read(&dst).unwrap(), payload);
    }

    #[test]
    fn einval_before_progress_falls_through_to_buffered() {
        let (_d, src, dst) = fixture(b"fallback content");
        let prims = Scripted {
            range: Some(RefCell::new(VecDeque::from([Step::Fail(libc::EINVAL)]))),
            ..Default::default()
        };
        let report = copy_file_with(&prims, &src, &dst, false).unwrap();
        assert_eq!(report.tier, CopyTier::Buffered);
        assert_eq!(fs::read(&dst).unwrap(), b"fallback content");
        assert_eq!(*prims.range_calls.borrow(), 1);
    }

    #[test]
    fn einval_after_progress_is_terminal() {
        let (_d, src, dst) = fixture(b"0123456789");
        let prims = Scripted {
            range: Some(RefCell::new(VecDeque::from([
                Step::Move(4),
                Step::Fail(libc::EINVAL),
            ]))),
            ..Default::default()
        };
        let err = copy_file_with(&prims, &src, &dst, false).unwrap_err();
        assert_eq!(err, OsError::InvalidArgument);
    }

    #[test]
    fn other_range_error_is_terminal() {
        let (_d, src, dst) = fixture(b"abc");
        let prims = Scripted {
            range: Some(RefCell::new(VecDeque::from([Step::Fail(libc::EXDEV)]))),
            ..Default::default()
        };
        let err = copy_file_with(&prims, &src, &dst, false).unwrap_err();
        assert_eq!(err, OsError::Io(libc::EXDEV));
    }

    #[test]
    fn range_retries_interrupts() {
        let (_d, src, dst) = fixture(b"hello world");
        let prims = Scripted {
            range: Some(RefCell::new(VecDeque::from([
                Step::Fail(libc::EINTR),
                Step::Move(5),
                Step::Fail(libc::EAGAIN),
                Step::Move(6),
            ]))),
            ..Default::default()
        };
        let report = copy_file_with(&prims, &src, &dst, false).unwrap();
        assert_eq!(report.tier, CopyTier::KernelRange);
        assert_eq!(report.bytes, 11);
        assert_eq!(fs::read(&dst).unwrap(), b"hello world");
    }

    #[test]
    fn whole_file_enotsup_falls_through() {
        let (_d, src, dst) = fixture(b"data");
        let prims = Scripted {
            whole: Some(libc::ENOTSUP),
            ..Default::default()
        };
        let report = copy_file_with(&prims, &src, &dst, false).unwrap();
        assert_eq!(report.tier, CopyTier::Buffered);
        assert_eq!(fs::read(&dst).unwrap(), b"data");
    }

    #[test]
    fn whole_file_other_error_is_terminal() {
        let (_d, src, dst) = fixture(b"data");
        let prims = Scripted {
            whole: Some(libc::EACCES),
            ..Default::default()
        };
        assert_eq!(
            copy_file_with(&prims, &src, &dst, false).unwrap_err(),
            OsError::PermissionDenied
        );
    }

    #[test]
    fn empty_source_probes_range_once() {
        let (_d, src, dst) = fixture(b"");
        let prims = Scripted {
            range: Some(RefCell::new(VecDeque::new())),
            ..Default::default()
        };
        let report = copy_file_with(&prims, &src, &dst, false).unwrap();
        assert_eq!(report.tier, CopyTier::KernelRange);
        assert_eq!(report.bytes, 0);
        assert_eq!(*prims.range_calls.borrow(), 1);
        assert!(dst.is_file());
    }

    #[test]
    fn buffered_copy_stops_at_early_eof() {
        let mut src: &[u8] = b"short";
        let mut out = Vec::new();
        let n = buffered_copy(&mut src, &mut out, 100).unwrap();
        assert_eq!(n, 5);
        assert_eq!(out, b"short");
    }
}
