//! Default path helpers and symlink checks.

use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "OSRT_CONFIG";

/// Config file location: `$OSRT_CONFIG` if set, else the OS config dir.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(p));
    }
    if let Some(base) = config_dir() {
        return Some(base.join("osrt").join("config.xml"));
    }
    env::var_os("HOME").map(|h| PathBuf::from(h).join(".config").join("osrt").join("config.xml"))
}

/// Suggested log file location (OS data dir). Nothing is created.
pub fn default_log_path() -> Option<PathBuf> {
    if let Some(base) = data_dir() {
        return Some(base.join("osrt").join("osrt.log"));
    }
    env::var_os("HOME").map(|h| {
        PathBuf::from(h)
            .join(".local")
            .join("share")
            .join("osrt")
            .join("osrt.log")
    })
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if !anc.as_os_str().is_empty() {
            match fs::symlink_metadata(anc) {
                Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn env_override_wins() {
        let saved = env::var_os(CONFIG_ENV);
        unsafe {
            env::set_var(CONFIG_ENV, "/etc/osrt-test.xml");
        }
        assert_eq!(default_config_path(), Some(PathBuf::from("/etc/osrt-test.xml")));
        unsafe {
            match saved {
                Some(v) => env::set_var(CONFIG_ENV, v),
                None => env::remove_var(CONFIG_ENV),
            }
        }
    }

    #[test]
    fn plain_dirs_have_no_symlink_ancestor() {
        let d = tempfile::tempdir().unwrap();
        let canon = fs::canonicalize(d.path()).unwrap();
        assert!(!path_has_symlink_ancestor(&canon.join("a").join("b.log")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_parent_is_detected() {
        let d = tempfile::tempdir().unwrap();
        let canon = fs::canonicalize(d.path()).unwrap();
        let real = canon.join("real");
        fs::create_dir(&real).unwrap();
        let link = canon.join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("x.log")).unwrap());
    }
}
