//! Crate configuration
//!
//! Deployments that don't back the allow-list with a catalog table can load
//! the approved directories from a TOML file:
//!
//! ```toml
//! directories = ["/srv/files", "/var/spool/reports"]
//! ```

use crate::allowlist::DirAllowList;
use crate::error::{Result, UtlFileError};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct UtlFileConfig {
    /// Approved directory prefixes, stored canonically in the allow-list.
    #[serde(default)]
    pub directories: Vec<String>,
}

impl UtlFileConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| UtlFileError::Configuration(format!("invalid config: {e}")))
    }

    /// Load a configuration file. An unreadable file is a configuration
    /// error, never an empty allow-list.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path).map_err(|e| {
            UtlFileError::Configuration(format!(
                "cannot read config {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml_str(&text)
    }

    /// Build the allow-list this configuration describes.
    pub fn into_allow_list(self) -> DirAllowList {
        DirAllowList::from_dirs(self.directories)
    }
}
