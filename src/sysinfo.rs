//! Host facts: separators, path limit, well-known directories, kernel and
//! architecture names, processor count.

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::platform;

/// Separator between entries of `PATH`-like lists.
pub const fn path_separator() -> char {
    if cfg!(windows) { ';' } else { ':' }
}

/// Separator between path components.
pub const fn dir_separator() -> char {
    if cfg!(windows) { '\\' } else { '/' }
}

static PATH_MAX: OnceLock<usize> = OnceLock::new();

/// Longest path the platform accepts. Computed once per process.
pub fn path_max() -> usize {
    *PATH_MAX.get_or_init(platform::path_max_uncached)
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// `$HOME`; on Windows also `%HOMEDRIVE%%HOMEPATH%`; otherwise `.`.
pub fn home_dir() -> PathBuf {
    if let Some(home) = non_empty_var("HOME") {
        return home;
    }
    if cfg!(windows) {
        if let (Some(drive), Some(rest)) = (env::var_os("HOMEDRIVE"), env::var_os("HOMEPATH")) {
            let mut joined = drive;
            joined.push(rest);
            if !joined.is_empty() {
                return PathBuf::from(joined);
            }
        }
    }
    PathBuf::from(".")
}

/// `$TEMP`, `$TEMPDIR`, on Windows `%LOCALAPPDATA%\Temp`; otherwise `/tmp`
/// (`c:\tmp` on Windows).
pub fn temp_dir() -> PathBuf {
    if let Some(t) = non_empty_var("TEMP").or_else(|| non_empty_var("TEMPDIR")) {
        return t;
    }
    if cfg!(windows) {
        if let Some(local) = non_empty_var("LOCALAPPDATA") {
            return local.join("Temp");
        }
        return PathBuf::from(r"c:\tmp");
    }
    PathBuf::from("/tmp")
}

/// Short kernel family name.
pub fn kernel_name() -> &'static str {
    match env::consts::OS {
        "linux" => "linux",
        "macos" => "osx",
        "ios" => "ios",
        "android" => "android",
        "windows" => "windows",
        "freebsd" => "unix-freebsd",
        "openbsd" => "unix-openbsd",
        "netbsd" => "unix-netbsd",
        "dragonfly" => "unix-dragonfly",
        "solaris" | "illumos" => "unix-solaris",
        "haiku" => "unix-haiku",
        _ if cfg!(unix) => "unix",
        _ => "unknown",
    }
}

/// Short CPU architecture name.
pub fn arch_name() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "x86",
        "aarch64" | "arm64ec" => "arm64",
        "arm" => "arm",
        "riscv32" | "riscv64" => "riscv",
        "powerpc" | "powerpc64" => "powerpc",
        "mips" | "mips64" | "mips32r6" | "mips64r6" => "mips",
        "sparc" | "sparc64" => "sparc",
        "m68k" => "m68k",
        _ => "unknown",
    }
}

/// Logical processors available to this process; at least 1.
pub fn processor_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn separators_match_platform() {
        assert_eq!(dir_separator(), std::path::MAIN_SEPARATOR);
        #[cfg(unix)]
        assert_eq!(path_separator(), ':');
    }

    #[test]
    fn path_max_is_cached_and_sane() {
        let a = path_max();
        assert!(a >= 256);
        assert_eq!(a, path_max());
    }

    #[test]
    fn names_are_known_on_tier1_hosts() {
        #[cfg(target_os = "linux")]
        assert_eq!(kernel_name(), "linux");
        #[cfg(target_os = "macos")]
        assert_eq!(kernel_name(), "osx");
        #[cfg(target_arch = "x86_64")]
        assert_eq!(arch_name(), "amd64");
        #[cfg(target_arch = "aarch64")]
        assert_eq!(arch_name(), "arm64");
    }

    #[test]
    fn processor_count_is_positive() {
        assert!(processor_count() >= 1);
    }

    #[test]
    #[serial]
    fn temp_dir_prefers_temp_then_tempdir() {
        let saved_temp = env::var_os("TEMP");
        let saved_tempdir = env::var_os("TEMPDIR");
        unsafe {
            env::set_var("TEMP", "/from/temp");
            env::set_var("TEMPDIR", "/from/tempdir");
        }
        assert_eq!(temp_dir(), PathBuf::from("/from/temp"));
        unsafe {
            env::remove_var("TEMP");
        }
        assert_eq!(temp_dir(), PathBuf::from("/from/tempdir"));
        unsafe {
            match saved_temp {
                Some(v) => env::set_var("TEMP", v),
                None => env::remove_var("TEMP"),
            }
            match saved_tempdir {
                Some(v) => env::set_var("TEMPDIR", v),
                None => env::remove_var("TEMPDIR"),
            }
        }
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn home_dir_falls_back_to_dot() {
        let saved = env::var_os("HOME");
        unsafe {
            env::remove_var("HOME");
        }
        assert_eq!(home_dir(), PathBuf::from("."));
        unsafe {
            env::set_var("HOME", "/home/someone");
        }
        assert_eq!(home_dir(), PathBuf::from("/home/someone"));
        unsafe {
            match saved {
                Some(v) => env::set_var("HOME", v),
                None => env::remove_var("HOME"),
            }
        }
    }
}
