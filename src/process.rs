//! Process-level services: running shell commands, arguments, environment.

use std::env;
use std::ffi::{OsStr, OsString};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::errors::OsResult;

/// Captured result of [`run_capture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, decoded lossily as UTF-8.
    pub stdout: String,
    pub exit_code: i32,
}

/// One `NAME=value` entry of the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvPair {
    pub name: OsString,
    pub value: OsString,
}

impl EnvPair {
    /// Split `entry` at the first `=`. Without one, the value is empty.
    pub fn parse(entry: &OsStr) -> EnvPair {
        let bytes = entry.as_encoded_bytes();
        match bytes.iter().position(|&b| b == b'=') {
            Some(i) => {
                // SAFETY: both halves are split around an ASCII byte.
                let (name, value) = unsafe {
                    (
                        OsStr::from_encoded_bytes_unchecked(&bytes[..i]),
                        OsStr::from_encoded_bytes_unchecked(&bytes[i + 1..]),
                    )
                };
                EnvPair {
                    name: name.to_os_string(),
                    value: value.to_os_string(),
                }
            }
            None => EnvPair {
                name: entry.to_os_string(),
                value: OsString::new(),
            },
        }
    }
}

fn shell(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    }
    #[cfg(not(windows))]
    {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Exit code, or `128 + signal` for a process killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    -1
}

/// Run `command` through the platform shell, inheriting stdio.
pub fn run(command: &str) -> OsResult<i32> {
    let status = shell(command).status()?;
    let code = exit_code(status);
    debug!(command, code, "command finished");
    Ok(code)
}

/// Run `command` through the platform shell and capture its stdout.
pub fn run_capture(command: &str) -> OsResult<CommandOutput> {
    let out = shell(command)
        .stdin(Stdio::inherit())
        .stderr(Stdio::inherit())
        .output()?;
    let exit_code = exit_code(out.status);
    debug!(command, code = exit_code, bytes = out.stdout.len(), "command captured");
    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        exit_code,
    })
}

/// Process arguments, including the program name.
pub fn get_args() -> Vec<OsString> {
    env::args_os().collect()
}

/// Snapshot of the process environment.
pub fn get_env() -> Vec<EnvPair> {
    env::vars_os()
        .map(|(name, value)| EnvPair { name, value })
        .collect()
}
