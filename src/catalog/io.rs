//! Loading and saving catalogs.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::{Catalog, LEGACY_PERMISSIONS_KEY};
use crate::core::SyncError;
use crate::utils::fs::{to_pretty_json, write_json_file};

impl Catalog {
    /// Loads a catalog, healing instead of failing.
    ///
    /// A missing, empty or unreadable file, or one that is not JSON, yields an
    /// empty catalog named `name`/`identifier`; the problem is logged. A single
    /// malformed entry is dropped without touching the others. The name and
    /// identifier are always overwritten with the given values so a renamed
    /// target takes effect on the next write.
    #[must_use]
    pub fn load(path: &Path, name: &str, identifier: &str) -> Self {
        let mut catalog = match Self::read(path) {
            Ok(Some(catalog)) => catalog,
            Ok(None) => {
                debug!("No catalog at {}, starting fresh", path.display());
                Self::new(name, identifier)
            }
            Err(e) => {
                warn!("Ignoring unreadable catalog {}: {e:#}", path.display());
                Self::new(name, identifier)
            }
        };

        name.clone_into(&mut catalog.name);
        identifier.clone_into(&mut catalog.identifier);
        catalog
    }

    fn read(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Self::from_json(&content)?))
    }

    /// Parses a catalog document.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Serializes the catalog exactly as [`Catalog::save`] writes it.
    pub fn to_json(&self) -> Result<String> {
        to_pretty_json(self)
    }

    /// Writes the catalog atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::CatalogWrite`], which is fatal for the run. The file
    /// on disk keeps its previous content in that case.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(path, self).map_err(|e| {
            SyncError::CatalogWrite {
                path: path.display().to_string(),
                reason: format!("{e:#}"),
            }
            .into()
        })
    }
}

impl super::CatalogEntry {
    /// Drops keys that older catalog generations wrote but that are no longer published.
    pub fn drop_legacy_keys(&mut self) {
        self.extra.remove(LEGACY_PERMISSIONS_KEY);
    }
}
