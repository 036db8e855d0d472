//! Metadata propagation for copies.
//! - Permission bits are applied with `fchmod` on the open destination.
//! - Access/modification times are copied with `futimens` via `filetime`.
//! - Both are best-effort: failures are logged and reported as `false`.

use filetime::{set_file_handle_times, FileTime};
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{trace, warn};

/// Set `mode` on the open destination, independent of the umask and of
/// whatever mode an overwritten file had.
pub fn apply_mode(dst: &File, mode: u32, path: &Path) -> bool {
    match dst.set_permissions(fs::Permissions::from_mode(mode)) {
        Ok(()) => {
            trace!(path = %path.display(), mode = format!("{:o}", mode), "set permissions on destination");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), mode = format!("{:o}", mode), error = %e, "failed to set permissions on destination");
            false
        }
    }
}

/// Copy atime/mtime from `src_meta` onto the open destination.
pub fn preserve_timestamps(dst: &File, src_meta: &fs::Metadata, path: &Path) -> bool {
    let at = FileTime::from_last_access_time(src_meta);
    let mt = FileTime::from_last_modification_time(src_meta);
    match set_file_handle_times(dst, Some(at), Some(mt)) {
        Ok(()) => {
            trace!(path = %path.display(), "set atime/mtime on destination");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to set atime/mtime on destination");
            false
        }
    }
}
