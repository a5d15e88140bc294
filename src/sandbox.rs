//! Path sandboxing
//!
//! Every filesystem path used by this crate is produced here: a requested
//! (directory, filename) pair is joined, lexically canonicalized, and checked
//! against the allowed-directory set before any filesystem access happens.
//! The result is a [`SafePath`], which no other module can construct.

use crate::allowlist::AllowListProvider;
use crate::error::{Result, UtlFileError};
use std::path::Path;
use std::sync::Arc;

/// Fixed directory that bypasses the allow-list lookup. Regression-test
/// plumbing only; production deployments must not rely on it.
pub const REGRESS_BYPASS_DIR: &str = "/tmp/utlfile_regress";

/// Lexically canonicalize a path: resolve `.` and `..` segments and collapse
/// redundant separators, without touching the filesystem (the path does not
/// need to exist). `..` at the root of an absolute path stays at the root.
pub fn canonicalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut resolved: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                if absolute {
                    resolved.pop();
                } else if matches!(resolved.last(), None | Some(&"..")) {
                    resolved.push("..");
                } else {
                    resolved.pop();
                }
            }
            _ => resolved.push(part),
        }
    }

    if absolute {
        format!("/{}", resolved.join("/"))
    } else if resolved.is_empty() {
        ".".to_string()
    } else {
        resolved.join("/")
    }
}

/// A canonical path that passed the allow-list gate.
///
/// Only [`PathSandbox::resolve`] produces these; holding one is proof the
/// path was validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePath(String);

impl SafePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl std::fmt::Display for SafePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates (directory, filename) pairs against an allow-list provider.
pub struct PathSandbox {
    provider: Arc<dyn AllowListProvider>,
}

impl PathSandbox {
    pub fn new(provider: Arc<dyn AllowListProvider>) -> Self {
        Self { provider }
    }

    /// Join `directory` and `filename`, canonicalize, and verify the result
    /// falls under an approved directory.
    ///
    /// # Errors
    ///
    /// - `ValueError` if either input is empty
    /// - `InvalidPath` if the canonical path is not under any approved
    ///   directory
    /// - `Configuration` if the allow-list provider cannot be queried
    pub fn resolve(&self, directory: &str, filename: &str) -> Result<SafePath> {
        if directory.is_empty() || filename.is_empty() {
            return Err(UtlFileError::ValueError(
                "empty string isn't allowed".to_string(),
            ));
        }

        let canonical = canonicalize(&format!("{directory}/{filename}"));

        if canonical == REGRESS_BYPASS_DIR
            || canonical.starts_with(&format!("{REGRESS_BYPASS_DIR}/"))
        {
            tracing::warn!(path = %canonical, "allow-list bypassed for regression directory");
            return Ok(SafePath(canonical));
        }

        let allowed = self
            .provider
            .allows(&canonical)
            .map_err(|e| UtlFileError::Configuration(e.to_string()))?;

        if !allowed {
            return Err(UtlFileError::InvalidPath(
                "locality is not found in the allowed directory list".to_string(),
            ));
        }

        Ok(SafePath(canonical))
    }
}
