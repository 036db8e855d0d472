//! Common Unix helpers shared by macOS and other Unix targets.
//! Includes the `opendir`/`readdir` cursor, checked descriptor close, the
//! secure log-file opener and atomic 0600 writes.

use anyhow::{Context, Result};
use std::ffi::{CStr, CString, OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::os::unix::io::IntoRawFd;
use std::path::Path;
use std::ptr::NonNull;

use super::temp::tmp_sibling_name;
use crate::dir::DirCursor;
use crate::errors::{OsError, OsResult};

/// Borrow `path` as a NUL-terminated C string for a single OS call.
fn c_path(path: &Path) -> OsResult<CString> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| OsError::InvalidArgument)
}

/// Reset `errno` so a NULL from `readdir` can be told apart from an error.
fn clear_errno() {
    // SAFETY: each accessor returns the calling thread's errno slot.
    #[cfg(any(target_os = "linux", target_os = "emscripten", target_os = "hurd"))]
    unsafe {
        *libc::__errno_location() = 0;
    }
    #[cfg(any(target_os = "android", target_os = "netbsd", target_os = "openbsd"))]
    unsafe {
        *libc::__errno() = 0;
    }
    #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
    unsafe {
        *libc::__error() = 0;
    }
    #[cfg(any(target_os = "solaris", target_os = "illumos"))]
    unsafe {
        *libc::___errno() = 0;
    }
}

/// `DIR*` cursor. Closed exactly once on drop.
pub struct UnixDirCursor {
    dir: NonNull<libc::DIR>,
}

impl DirCursor for UnixDirCursor {
    fn open(path: &Path) -> OsResult<(Self, Option<OsString>)> {
        let cpath = c_path(path)?;
        // SAFETY: cpath is a valid NUL-terminated string for the duration of the call.
        let raw = unsafe { libc::opendir(cpath.as_ptr()) };
        let Some(dir) = NonNull::new(raw) else {
            return Err(io::Error::last_os_error().into());
        };
        let mut cursor = UnixDirCursor { dir };
        let first = cursor.advance()?;
        Ok((cursor, first))
    }

    fn advance(&mut self) -> OsResult<Option<OsString>> {
        clear_errno();
        // SAFETY: self.dir is an open DIR* owned by this cursor.
        let ent = unsafe { libc::readdir(self.dir.as_ptr()) };
        if ent.is_null() {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                None | Some(0) | Some(libc::ENOENT) => Ok(None),
                Some(_) => Err(err.into()),
            };
        }
        // SAFETY: readdir returned a valid dirent whose d_name is NUL-terminated and
        // lives until the next readdir/closedir on this stream; we copy it out here.
        let name = unsafe { CStr::from_ptr((*ent).d_name.as_ptr()) };
        Ok(Some(OsStr::from_bytes(name.to_bytes()).to_os_string()))
    }
}

impl Drop for UnixDirCursor {
    fn drop(&mut self) {
        // SAFETY: the stream was opened by opendir and is closed only here.
        unsafe {
            libc::closedir(self.dir.as_ptr());
        }
    }
}

/// Close `file` and report the result of `close(2)`.
/// `EINTR` counts as closed: Linux and macOS release the descriptor regardless.
pub fn close_checked(file: File) -> OsResult<()> {
    let fd = file.into_raw_fd();
    // SAFETY: fd was owned by `file` and is closed exactly once here.
    if unsafe { libc::close(fd) } == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::Interrupted {
        return Ok(());
    }
    Err(err.into())
}

/// Open log file for appending; set 0600 only when creating a new file.
/// An existing file keeps its mode (e.g. group-readable for log shipping).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(path)?;
    if !existed {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

/// Atomically write `contents` to `path` as a 0600 file:
/// temp sibling (O_EXCL) + fsync + rename + fsync of the parent directory.
/// On failure the temp file is removed best-effort.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "config path has no parent"))?;
    fs::create_dir_all(parent).with_context(|| format!("create parent '{}'", parent.display()))?;

    let tmp = tmp_sibling_name(path);
    let mut f = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(&tmp)
        .with_context(|| format!("create temp '{}'", tmp.display()))?;
    if let Err(e) = f.write_all(contents).and_then(|()| f.sync_all()) {
        drop(f);
        let _ = fs::remove_file(&tmp);
        return Err(e).context("write temp");
    }
    drop(f);

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e)
            .with_context(|| format!("rename '{}' -> '{}'", tmp.display(), path.display()));
    }

    let dir_file =
        File::open(parent).with_context(|| format!("open dir '{}'", parent.display()))?;
    dir_file.sync_all().context("fsync parent dir")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn preserve_existing_log_file_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(&path, b"hello").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        let _f = open_log_file_secure_append(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640, "existing permissions should be preserved");
    }

    #[test]
    fn new_log_file_gets_0600() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new_log.txt");
        let _f = open_log_file_secure_append(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn atomic_config_write_sets_mode_and_no_temp_leftover() {
        let dir = tempdir().unwrap();
        let cfg = dir.path().join("config.xml");
        write_config_secure_new_0600(&cfg, b"<config/>").unwrap();
        assert_eq!(fs::read(&cfg).unwrap(), b"<config/>");
        let mode = fs::metadata(&cfg).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        for entry in fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name();
            let name = name.to_string_lossy();
            assert!(!name.starts_with(".osrt.tmp."), "leftover temp file: {name}");
        }
    }

    #[test]
    fn close_checked_reports_ok() {
        let dir = tempdir().unwrap();
        let f = File::create(dir.path().join("c")).unwrap();
        assert_eq!(close_checked(f), Ok(()));
    }

    #[test]
    fn cursor_open_missing_dir_is_not_found() {
        let dir = tempdir().unwrap();
        let err = UnixDirCursor::open(&dir.path().join("nope")).err().unwrap();
        assert_eq!(err, OsError::NotFound);
    }

    #[test]
    fn cursor_open_on_file_is_not_a_directory() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("file");
        fs::write(&f, b"x").unwrap();
        let err = UnixDirCursor::open(&f).err().unwrap();
        assert_eq!(err, OsError::NotADirectory);
    }

    #[test]
    fn cursor_yields_pseudo_entries_raw() {
        let dir = tempdir().unwrap();
        let (mut cursor, first) = UnixDirCursor::open(dir.path()).unwrap();
        let mut raw = vec![first.unwrap()];
        while let Some(name) = cursor.advance().unwrap() {
            raw.push(name);
        }
        raw.sort();
        assert_eq!(raw, vec![OsString::from("."), OsString::from("..")]);
    }
}
