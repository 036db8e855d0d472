//! Windows implementations of platform helpers.
//!
//! Notes:
//! - Directory enumeration uses `FindFirstFileW`/`FindNextFileW`.
//! - File copy is `CopyFileW` on the two paths (overwrites, keeps timestamps).
//! - Windows lacks POSIX mode semantics; log/config files get no ACL changes.

use anyhow::{bail, Result};
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use windows_sys::Win32::Foundation::{
    ERROR_NO_MORE_FILES, GetLastError, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{
    CopyFileW, FindClose, FindFirstFileW, FindNextFileW, WIN32_FIND_DATAW,
};
use windows_sys::Win32::System::LibraryLoader::GetModuleFileNameW;

use super::temp::tmp_sibling_name;
use crate::dir::DirCursor;
use crate::errors::OsResult;

fn wide(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(std::iter::once(0)).collect()
}

fn last_error() -> io::Error {
    // SAFETY: reads the calling thread's last-error value.
    io::Error::from_raw_os_error(unsafe { GetLastError() } as i32)
}

/// Find-handle cursor. Closed exactly once on drop.
pub struct WinDirCursor {
    handle: HANDLE,
    data: WIN32_FIND_DATAW,
}

impl WinDirCursor {
    fn current_name(&self) -> OsString {
        let name = &self.data.cFileName;
        let len = name.iter().position(|&c| c == 0).unwrap_or(name.len());
        OsString::from_wide(&name[..len])
    }
}

impl DirCursor for WinDirCursor {
    fn open(path: &Path) -> OsResult<(Self, Option<OsString>)> {
        let mut pattern = path.as_os_str().to_os_string();
        pattern.push("\\*");
        let wpattern = wide(&pattern);
        // SAFETY: WIN32_FIND_DATAW is plain data; all-zero is a valid value.
        let mut data: WIN32_FIND_DATAW = unsafe { std::mem::zeroed() };
        // SAFETY: wpattern is NUL-terminated and data is writable.
        let handle = unsafe { FindFirstFileW(wpattern.as_ptr(), &mut data) };
        if handle == INVALID_HANDLE_VALUE {
            return Err(last_error().into());
        }
        let cursor = WinDirCursor { handle, data };
        let first = cursor.current_name();
        Ok((cursor, Some(first)))
    }

    fn advance(&mut self) -> OsResult<Option<OsString>> {
        // SAFETY: handle is an open find handle owned by this cursor.
        if unsafe { FindNextFileW(self.handle, &mut self.data) } != 0 {
            return Ok(Some(self.current_name()));
        }
        // SAFETY: reads the calling thread's last-error value.
        let code = unsafe { GetLastError() };
        if code == ERROR_NO_MORE_FILES {
            Ok(None)
        } else {
            Err(io::Error::from_raw_os_error(code as i32).into())
        }
    }
}

impl Drop for WinDirCursor {
    fn drop(&mut self) {
        // SAFETY: the handle came from FindFirstFileW and is closed only here.
        unsafe {
            FindClose(self.handle);
        }
    }
}

/// `CopyFileW(from, to, overwrite)`.
pub fn copy_file_whole(src: &Path, dst: &Path) -> OsResult<()> {
    let wsrc = wide(src.as_os_str());
    let wdst = wide(dst.as_os_str());
    // SAFETY: both strings are NUL-terminated wide strings.
    if unsafe { CopyFileW(wsrc.as_ptr(), wdst.as_ptr(), 0) } == 0 {
        return Err(last_error().into());
    }
    Ok(())
}

/// Handles close on drop; `CloseHandle` failures are not observable through std.
pub fn close_checked(file: File) -> OsResult<()> {
    drop(file);
    Ok(())
}

/// `GetModuleFileNameW(NULL)`, retried once with a `path_max()` buffer.
pub fn self_exe_path() -> Option<PathBuf> {
    for size in [264usize, crate::sysinfo::path_max() + 1] {
        let mut buf = vec![0u16; size];
        // SAFETY: buf is writable for `size` u16 units; NULL selects this module.
        let len = unsafe {
            GetModuleFileNameW(std::ptr::null_mut(), buf.as_mut_ptr(), size as u32)
        } as usize;
        if len == 0 {
            return None;
        }
        if len < size {
            return Some(PathBuf::from(OsString::from_wide(&buf[..len])));
        }
    }
    None
}

pub fn path_max_uncached() -> usize {
    32 * 1024
}

/// Open log file for appending (no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Write a new config file via temp + rename. Fails if the target exists.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    let tmp = tmp_sibling_name(path);
    let mut f = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
    f.write_all(contents)?;
    f.sync_all()?;
    drop(f);
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
