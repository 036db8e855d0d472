//! Unix (non-macOS) implementations: `sendfile` range copy, `/proc` self path,
//! `pathconf` path limit.

use std::fs;
use std::path::PathBuf;

use crate::fs_ops::copy::CopyPrimitives;

/// Native copy primitives for this platform family.
///
/// Linux offers `sendfile(2)` between regular files, which also works across
/// filesystems; there is no whole-file primitive.
/// Other Unixes fall straight through to the buffered loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCopy;

impl CopyPrimitives for NativeCopy {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn copy_range(
        &self,
        src: &std::fs::File,
        dst: &std::fs::File,
        chunk: usize,
    ) -> Option<std::io::Result<usize>> {
        use std::os::unix::io::AsRawFd;
        // SAFETY: both descriptors are open for the duration of the call; a NULL
        // offset makes the kernel use and advance the source position, and the
        // destination position advances with the write.
        let rc = unsafe {
            libc::sendfile(
                dst.as_raw_fd(),
                src.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
            )
        };
        if rc < 0 {
            Some(Err(std::io::Error::last_os_error()))
        } else {
            Some(Ok(rc as usize))
        }
    }
}

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
const PROC_SELF: Option<&str> = Some("/proc/self/path/a.out");
#[cfg(target_os = "netbsd")]
const PROC_SELF: Option<&str> = Some("/proc/curproc/exe");
#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
const PROC_SELF: Option<&str> = Some("/proc/curproc/file");
#[cfg(any(target_os = "linux", target_os = "android", target_os = "hurd"))]
const PROC_SELF: Option<&str> = Some("/proc/self/exe");
#[cfg(not(any(
    target_os = "solaris",
    target_os = "illumos",
    target_os = "netbsd",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "linux",
    target_os = "android",
    target_os = "hurd"
)))]
const PROC_SELF: Option<&str> = None;

/// Resolve the self-referential proc entry. `None` when procfs is absent or
/// the link cannot be canonicalized.
pub fn self_exe_path() -> Option<PathBuf> {
    let link = PROC_SELF?;
    fs::canonicalize(link).ok()
}

/// `pathconf("/", _PC_PATH_MAX)`, at least 256; 4096 when unknown.
pub fn path_max_uncached() -> usize {
    // SAFETY: the argument is a static NUL-terminated string.
    let m = unsafe { libc::pathconf(c"/".as_ptr(), libc::_PC_PATH_MAX) };
    if m <= 0 {
        4096
    } else if m < 256 {
        256
    } else {
        m as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn proc_self_resolves_to_test_binary() {
        let p = self_exe_path().expect("/proc/self/exe should resolve on Linux");
        assert!(p.is_absolute());
        assert!(p.is_file());
    }

    #[test]
    fn path_max_is_sane() {
        let m = path_max_uncached();
        assert!(m >= 256);
    }
}
