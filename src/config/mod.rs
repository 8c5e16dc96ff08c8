//! Run configuration (`altsync.toml`).
//!
//! The file is optional; every section has defaults. It names the catalogs to
//! synchronize and tunes the HTTP client:
//!
//! ```toml
//! [github]
//! api_base = "https://api.github.com"
//!
//! [retry]
//! max_retries = 3
//! base_delay_ms = 1000
//!
//! [sync]
//! default_tint = "#000000"
//! write_back_icons = false
//!
//! [[catalogs]]
//! name = "Example Source"
//! identifier = "io.example.source"
//! curated_list = "sources/standard/apps.json"
//! catalog = "sources/standard/source.json"
//! ```
//!
//! Relative paths in `[[catalogs]]` are resolved against the directory that
//! contains the configuration file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::SyncError;
use crate::sync::SyncOptions;
use crate::upstream::{GitHubEndpoints, RetryPolicy};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "altsync.toml";

/// One curated list and the catalog generated from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogTarget {
    /// Catalog display name, written into the catalog on every run.
    pub name: String,
    /// Catalog identifier, written into the catalog on every run.
    pub identifier: String,
    /// Path of the curated list (`apps.json`).
    pub curated_list: PathBuf,
    /// Path of the generated catalog (`source.json`).
    pub catalog: PathBuf,
}

/// Contents of `altsync.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub github: GitHubEndpoints,
    pub retry: RetryPolicy,
    pub sync: SyncOptions,
    pub catalogs: Vec<CatalogTarget>,
}

impl SyncConfig {
    /// Loads `path`, or the defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// [`SyncError::ConfigParse`] if the file cannot be read or is not valid
    /// configuration TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// [`SyncError::ConfigParse`] if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let parse_error = |reason: String| SyncError::ConfigParse {
            file: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
        let mut config: Self = toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for target in &mut self.catalogs {
            if target.curated_list.is_relative() {
                target.curated_list = base.join(&target.curated_list);
            }
            if target.catalog.is_relative() {
                target.catalog = base.join(&target.catalog);
            }
        }
    }

    /// The configured catalogs, restricted to `names` when it is non-empty.
    ///
    /// # Errors
    ///
    /// [`SyncError::Other`] naming the first unknown catalog.
    pub fn select(&self, names: &[String]) -> Result<Vec<CatalogTarget>> {
        if names.is_empty() {
            return Ok(self.catalogs.clone());
        }
        names
            .iter()
            .map(|name| {
                self.catalogs.iter().find(|t| &t.name == name).cloned().ok_or_else(|| {
                    anyhow::Error::from(SyncError::Other {
                        message: format!("Unknown catalog '{name}' (not in {CONFIG_FILE_NAME})"),
                    })
                })
            })
            .collect()
    }
}
