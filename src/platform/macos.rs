//! macOS implementations: `fcopyfile` whole-file copy, `proc_pidpath` self
//! path, `PATH_MAX`.

use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;

use crate::fs_ops::copy::CopyPrimitives;

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCopy;

impl CopyPrimitives for NativeCopy {
    fn whole_file(&self, src: &File, dst: &File) -> Option<io::Result<()>> {
        // Data only: mode and timestamps are applied by the engine so that the
        // caller's preserve flag keeps its meaning. APFS may clone here.
        // SAFETY: both descriptors are open; a NULL state is allowed.
        let rc = unsafe {
            libc::fcopyfile(
                src.as_raw_fd(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                libc::COPYFILE_DATA,
            )
        };
        if rc == 0 {
            Some(Ok(()))
        } else {
            Some(Err(io::Error::last_os_error()))
        }
    }
}

/// `proc_pidpath` for the current process.
pub fn self_exe_path() -> Option<PathBuf> {
    let mut buf = vec![0u8; libc::PROC_PIDPATHINFO_MAXSIZE as usize];
    // SAFETY: buf is writable for the size passed.
    let ret = unsafe {
        libc::proc_pidpath(
            std::process::id() as libc::c_int,
            buf.as_mut_ptr().cast(),
            libc::PROC_PIDPATHINFO_MAXSIZE as u32,
        )
    };
    if ret <= 0 {
        return None;
    }
    buf.truncate(ret as usize);
    Some(PathBuf::from(OsStr::from_bytes(&buf)))
}

pub fn path_max_uncached() -> usize {
    libc::PATH_MAX as usize
}
