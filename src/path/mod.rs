//! Path resolution: canonicalization, search-path probing and discovery of
//! the running executable.

mod ensure_dir;

pub use ensure_dir::{ensure_dir, DEFAULT_DIR_MODE};

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::platform;

/// Canonical absolute form of `path`, or `path` unchanged if it cannot be
/// resolved (missing, permission denied, ...).
pub fn realpath(path: &Path) -> PathBuf {
    match dunce::canonicalize(path) {
        Ok(p) => p,
        Err(e) => {
            trace!(path = %path.display(), error = %e, "realpath failed; keeping path as given");
            path.to_path_buf()
        }
    }
}

/// First regular file named `name` in the list `paths`, canonicalized.
/// `paths` uses the platform list separator (`:` or `;`); an empty entry
/// means the current directory.
pub fn search_path(paths: &OsStr, name: &OsStr) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    env::split_paths(paths)
        .map(|segment| {
            // An empty entry is the current directory.
            if segment.as_os_str().is_empty() {
                Path::new(".").join(name)
            } else {
                segment.join(name)
            }
        })
        .find(|candidate| candidate.is_file())
        .map(|found| realpath(&found))
}

fn has_separator(name: &OsStr) -> bool {
    name.as_encoded_bytes()
        .iter()
        .any(|&b| b == b'/' || (cfg!(windows) && b == b'\\'))
}

/// Locate the executable from `argv0` alone, probing `paths` for bare names.
pub fn app_path_generic(argv0: Option<&OsStr>, paths: Option<&OsStr>) -> Option<PathBuf> {
    let argv0 = argv0.filter(|a| !a.is_empty())?;
    let as_path = Path::new(argv0);
    if as_path.has_root() {
        return Some(realpath(as_path));
    }
    if has_separator(argv0) {
        return Some(realpath(&Path::new(".").join(as_path)));
    }
    if let Some(found) = paths.and_then(|p| search_path(p, argv0)) {
        return Some(found);
    }
    Some(realpath(as_path))
}

/// Absolute path of the running executable.
///
/// Uses the platform mechanism first (procfs link, `proc_pidpath`,
/// `GetModuleFileNameW`) and falls back to resolving `argv[0]` against `PATH`.
pub fn app_path() -> Option<PathBuf> {
    if let Some(p) = platform::self_exe_path() {
        debug!(path = %p.display(), "app path from platform");
        return Some(p);
    }
    let argv0 = env::args_os().next();
    let paths = env::var_os("PATH");
    let found = app_path_generic(argv0.as_deref(), paths.as_deref());
    debug!(path = ?found, "app path from argv[0]");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn realpath_of_missing_is_identity() {
        let p = Path::new("definitely/not/here");
        assert_eq!(realpath(p), p);
    }

    #[test]
    fn search_path_skips_directories_with_that_name() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::create_dir(a.path().join("tool")).unwrap();
        fs::write(b.path().join("tool"), b"#!/bin/sh\n").unwrap();
        let list = env::join_paths([a.path(), b.path()]).unwrap();
        let got = search_path(&list, OsStr::new("tool")).unwrap();
        assert_eq!(got, realpath(&b.path().join("tool")));
    }

    #[test]
    fn search_path_empty_name_is_none() {
        assert_eq!(search_path(OsStr::new("/bin"), OsStr::new("")), None);
    }

    #[test]
    fn generic_without_argv0_is_none() {
        assert_eq!(app_path_generic(None, None), None);
        assert_eq!(app_path_generic(Some(OsStr::new("")), None), None);
    }

    #[test]
    fn generic_absolute_is_canonicalized() {
        let d = tempfile::tempdir().unwrap();
        let exe = d.path().join("prog");
        fs::write(&exe, b"").unwrap();
        assert_eq!(
            app_path_generic(Some(exe.as_os_str()), None),
            Some(realpath(&exe))
        );
    }

    #[test]
    fn generic_bare_name_probes_paths() {
        let d = tempfile::tempdir().unwrap();
        fs::write(d.path().join("osrt-probe-bin"), b"").unwrap();
        let list = env::join_paths([d.path()]).unwrap();
        let got = app_path_generic(Some(OsStr::new("osrt-probe-bin")), Some(&list));
        assert_eq!(got, Some(realpath(&d.path().join("osrt-probe-bin"))));
    }

    #[test]
    fn generic_bare_name_not_found_is_returned_as_is() {
        let d = tempfile::tempdir().unwrap();
        let list = env::join_paths([d.path()]).unwrap();
        let got = app_path_generic(Some(OsStr::new("osrt-missing-bin")), Some(&list));
        assert_eq!(got, Some(PathBuf::from("osrt-missing-bin")));
    }

    #[test]
    fn app_path_is_absolute() {
        let p = app_path().expect("test binary path");
        assert!(p.is_absolute());
    }
}
