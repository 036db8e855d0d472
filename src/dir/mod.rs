//! Directory enumeration.
//!
//! A [`DirCursor`] wraps one OS directory handle (`DIR*` on Unix, a find
//! handle on Windows). [`list_directory`] drives the native cursor through
//! [`Entries`] and collects names with the [`accumulate`] growth policy.

pub mod accumulate;

use std::ffi::{OsStr, OsString};
use std::path::Path;

use tracing::{debug, trace};

use crate::errors::OsResult;
use crate::platform::NativeDirCursor;

pub use accumulate::{accumulate, GrowthPolicy};

/// Traversal contract shared by the platform backends.
///
/// `open` positions the cursor on the first raw entry (or end). Dropping the
/// cursor releases the handle.
pub trait DirCursor: Sized {
    fn open(path: &Path) -> OsResult<(Self, Option<OsString>)>;
    fn advance(&mut self) -> OsResult<Option<OsString>>;
}

/// Filter a raw entry: `.` and `..` (and empty names) are never reported.
pub fn entry_name(raw: OsString) -> Option<OsString> {
    let s: &OsStr = &raw;
    if s.is_empty() || s == "." || s == ".." {
        return None;
    }
    Some(raw)
}

/// Iterator over the filtered names of an open cursor.
/// Yields at most one error, after which it is exhausted.
pub struct Entries<C: DirCursor> {
    cursor: C,
    pending: Option<OsString>,
    done: bool,
}

impl<C: DirCursor> Entries<C> {
    pub fn open(path: &Path) -> OsResult<Self> {
        let (cursor, first) = C::open(path)?;
        Ok(Self {
            done: first.is_none(),
            cursor,
            pending: first,
        })
    }
}

impl<C: DirCursor> Iterator for Entries<C> {
    type Item = OsResult<OsString>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let raw = match self.pending.take() {
                Some(raw) => raw,
                None => match self.cursor.advance() {
                    Ok(Some(raw)) => raw,
                    Ok(None) => {
                        self.done = true;
                        return None;
                    }
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                },
            };
            if let Some(name) = entry_name(raw) {
                return Some(Ok(name));
            }
        }
        None
    }
}

/// Names found in one directory plus the terminal status of the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    /// Entry names in OS order, without `.`/`..`.
    pub names: Vec<OsString>,
    /// `Ok` when the walk reached the end; otherwise the error that stopped it.
    pub status: OsResult<()>,
}

impl DirListing {
    /// Discard partial names on error.
    pub fn into_result(self) -> OsResult<Vec<OsString>> {
        self.status.map(|()| self.names)
    }
}

/// List `path` with the native cursor.
pub fn list_directory(path: &Path) -> DirListing {
    list_directory_with::<NativeDirCursor>(path, GrowthPolicy::DEFAULT)
}

/// List `path` with any cursor implementation and growth policy.
pub fn list_directory_with<C: DirCursor>(path: &Path, policy: GrowthPolicy) -> DirListing {
    let entries = match Entries::<C>::open(path) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "open directory failed");
            return DirListing {
                names: Vec::new(),
                status: Err(e),
            };
        }
    };
    let (names, status) = accumulate(entries, policy);
    match &status {
        Ok(()) => trace!(path = %path.display(), count = names.len(), "listed directory"),
        Err(e) => debug!(path = %path.display(), count = names.len(), error = %e, "directory walk stopped early"),
    }
    DirListing { names, status }
}
