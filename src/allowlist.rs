//! Allowed-directory providers
//!
//! The sandbox consults an [`AllowListProvider`] for every path resolution.
//! The provider is an external boundary: deployments back it with a catalog
//! table, a config file, or a fixed set. A provider failure is a fatal
//! configuration error, never a silent allow.

use crate::sandbox::canonicalize;
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// Error raised when the allow-list backing store cannot be queried.
#[derive(Debug, Clone)]
pub struct AllowListUnavailable(pub String);

impl std::fmt::Display for AllowListUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "allow-list provider unavailable: {}", self.0)
    }
}

impl std::error::Error for AllowListUnavailable {}

/// Queryable set of approved directory prefixes.
pub trait AllowListProvider: Send + Sync {
    /// Whether `canonical_path` falls under one of the approved directories.
    ///
    /// A match requires the approved directory followed by a path separator;
    /// `/data` must not match anything under `/data2`.
    fn allows(&self, canonical_path: &str) -> Result<bool, AllowListUnavailable>;
}

/// In-memory allow-list over a sorted set of canonical directories.
///
/// Directories are stored in canonical form (trailing separators stripped),
/// so `insert("/var/spool/")` and a lookup for `/var/spool/out.txt` agree.
/// Interior mutability lets deployments register and revoke directories
/// while sessions hold a shared reference.
#[derive(Default)]
pub struct DirAllowList {
    dirs: RwLock<BTreeSet<String>>,
}

impl DirAllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an allow-list from an iterator of directory paths.
    pub fn from_dirs<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list = Self::new();
        for dir in dirs {
            list.insert(dir.as_ref());
        }
        list
    }

    /// Register a directory. The stored form is canonical.
    pub fn insert(&self, dir: &str) {
        self.dirs.write().insert(canonicalize(dir));
    }

    /// Revoke a directory. Returns whether it was present.
    pub fn remove(&self, dir: &str) -> bool {
        self.dirs.write().remove(&canonicalize(dir))
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.read().is_empty()
    }
}

impl AllowListProvider for DirAllowList {
    fn allows(&self, canonical_path: &str) -> Result<bool, AllowListUnavailable> {
        let dirs = self.dirs.read();
        Ok(dirs.iter().any(|dir| {
            canonical_path.len() > dir.len()
                && canonical_path.starts_with(dir.as_str())
                && canonical_path.as_bytes()[dir.len()] == b'/'
        }))
    }
}
