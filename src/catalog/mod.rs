//! The persisted catalog served to end users (`source.json`).
//!
//! A catalog is an AltStore-style source document: a name, an identifier and an
//! ordered list of apps, each with a newest-first version history.
//!
//! ```json
//! {
//!   "name": "Example Source",
//!   "identifier": "io.example.source",
//!   "apps": [
//!     {
//!       "name": "Foo",
//!       "githubRepo": "org/foo",
//!       "bundleIdentifier": "com.org.foo",
//!       "version": "1.0.0",
//!       "versions": [ { "version": "1.0.0", "downloadURL": "...", "sha256": "..." } ]
//!     }
//!   ],
//!   "news": []
//! }
//! ```
//!
//! # Invariants
//!
//! - `versions` is newest-first and append-only; a download URL appears at most once
//! - top-level `version`/`downloadURL`/... mirror `versions[0]`
//! - keys the engine does not model are preserved verbatim
//!
//! Loading never fails: a missing or corrupted file yields an empty catalog
//! (see [`Catalog::load`]). Within a readable document, `null` counts as an
//! absent key and an entry that still does not fit is dropped on its own.
//! Saving is atomic.

mod io;
mod prune;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Legacy entry key that is dropped whenever an entry is refreshed.
pub const LEGACY_PERMISSIONS_KEY: &str = "permissions";

/// The whole persisted catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Human-readable catalog name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Reverse-DNS catalog identifier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub identifier: String,

    #[serde(default, deserialize_with = "readable_entries")]
    pub apps: Vec<CatalogEntry>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub news: Vec<serde_json::Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One app in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Absent on entries written before repository tracking existed.
    #[serde(default, rename = "githubRepo", skip_serializing_if = "Option::is_none")]
    pub repo_slug: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub bundle_identifier: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub developer_name: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "version")]
    pub current_version: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "versionDate")]
    pub current_version_date: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "versionDescription")]
    pub current_version_notes: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "downloadURL")]
    pub current_download_url: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "localizedDescription")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "iconURL")]
    pub icon_url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tint_color: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "size")]
    pub size_bytes: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    #[serde(default, deserialize_with = "null_as_default", rename = "screenshotURLs")]
    pub screenshot_urls: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default", rename = "versions")]
    pub version_history: Vec<VersionRecord>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One published build of an app. Never modified once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,

    /// `CFBundleVersion` of the package, when the manifest could be read.
    #[serde(default, rename = "buildVersion", skip_serializing_if = "Option::is_none")]
    pub build_version: Option<String>,

    /// Release date, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "localizedDescription")]
    pub notes: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "downloadURL")]
    pub download_url: String,

    #[serde(default, deserialize_with = "null_as_default", rename = "size")]
    pub size_bytes: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub sha256: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses entries one by one so a single malformed entry does not take the
/// rest of the catalog down with it.
fn readable_entries<'de, D>(deserializer: D) -> Result<Vec<CatalogEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut entries = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<CatalogEntry>(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Dropping unreadable catalog entry #{index}: {e}"),
        }
    }
    Ok(entries)
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            apps: Vec::new(),
            news: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Finds the entry for `(repo, name)`.
    ///
    /// An exact match wins. Otherwise, if exactly one entry tracks `repo`, that
    /// entry is returned: it predates flavor support and is adopted by the first
    /// flavor that asks for it.
    #[must_use]
    pub fn find_match(&self, repo: &str, name: &str) -> Option<usize> {
        if let Some(index) = self
            .apps
            .iter()
            .position(|e| e.repo_slug.as_deref() == Some(repo) && e.name == name)
        {
            return Some(index);
        }

        let mut same_repo =
            self.apps.iter().enumerate().filter(|(_, e)| e.repo_slug.as_deref() == Some(repo));
        match (same_repo.next(), same_repo.next()) {
            (Some((index, _)), None) => Some(index),
            _ => None,
        }
    }
}

impl CatalogEntry {
    /// Whether a version with this download URL is already recorded.
    #[must_use]
    pub fn has_download(&self, download_url: &str) -> bool {
        self.version_history.iter().any(|v| v.download_url == download_url)
    }

    /// Prepends `record` and mirrors it into the top-level fields.
    ///
    /// A record whose download URL is already present is ignored so the
    /// history never contains duplicates. Returns whether it was added.
    pub fn push_version(&mut self, record: VersionRecord) -> bool {
        if self.has_download(&record.download_url) {
            return false;
        }
        self.mirror(&record);
        self.version_history.insert(0, record);
        true
    }

    fn mirror(&mut self, record: &VersionRecord) {
        self.current_version.clone_from(&record.version);
        self.current_version_date.clone_from(&record.date);
        self.current_version_notes.clone_from(&record.notes);
        self.current_download_url.clone_from(&record.download_url);
        self.size_bytes = record.size_bytes;
        self.sha256 = Some(record.sha256.clone());
    }
}
