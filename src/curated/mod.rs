//! The human-curated list of tracked apps (`apps.json`).
//!
//! The curated list is owned by people, not by the engine: it is read once per
//! run and only written back when auto-discovered metadata is synced into an
//! empty override (see [`CuratedList::set_icon_override`]). Fields the engine
//! does not understand are carried through untouched.
//!
//! ```json
//! [
//!   {
//!     "name": "UTM HV",
//!     "github_repo": "utmapp/UTM",
//!     "category": "Standard",
//!     "pre_release": false,
//!     "ipa_regex": "UTM-HV"
//!   }
//! ]
//! ```

pub mod validation;

use crate::constants::PLACEHOLDER_OVERRIDES;
use crate::core::SyncError;
use crate::utils::fs::{to_pretty_json, write_json_file};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use validation::{ValidationIssue, validate_apps};

/// One tracked repository flavor. `(repo, name)` is the identity key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedApp {
    /// Display name; also distinguishes flavors of the same repository.
    pub name: String,

    /// Repository slug in `owner/name` form.
    #[serde(rename = "github_repo")]
    pub repo: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Explicit icon URL; placeholder values count as unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    /// Explicit `#RRGGBB` tint; placeholder values count as unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint_color: Option<String>,

    #[serde(default, rename = "pre_release", skip_serializing_if = "is_false")]
    pub prefer_pre_release: bool,

    /// Regex a release tag must match to be considered.
    #[serde(default, rename = "tag_regex", skip_serializing_if = "Option::is_none")]
    pub tag_filter: Option<String>,

    /// Regex preferring one asset among several packages.
    #[serde(default, rename = "ipa_regex", skip_serializing_if = "Option::is_none")]
    pub asset_filter: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Returns the value unless it is empty or one of the placeholder strings
/// issue forms leave behind.
fn effective(value: Option<&String>) -> Option<&str> {
    let value = value?.trim();
    if PLACEHOLDER_OVERRIDES.contains(&value.to_lowercase().as_str()) {
        None
    } else {
        Some(value)
    }
}

impl TrackedApp {
    /// Creates an entry with only the identity fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
            category: None,
            icon_url: None,
            tint_color: None,
            prefer_pre_release: false,
            tag_filter: None,
            asset_filter: None,
            extra: serde_json::Map::new(),
        }
    }

    /// The icon override, if a real one is set.
    #[must_use]
    pub fn icon_override(&self) -> Option<&str> {
        effective(self.icon_url.as_ref())
    }

    /// The tint override, if a real one is set.
    #[must_use]
    pub fn tint_override(&self) -> Option<&str> {
        effective(self.tint_color.as_ref())
    }

    #[must_use]
    pub fn tag_filter(&self) -> Option<&str> {
        effective(self.tag_filter.as_ref())
    }

    #[must_use]
    pub fn asset_filter(&self) -> Option<&str> {
        effective(self.asset_filter.as_ref())
    }

    /// Whether `(repo, name)` identifies this app.
    #[must_use]
    pub fn is_identified_by(&self, repo: &str, name: &str) -> bool {
        self.repo == repo && self.name == name
    }
}

/// The ordered curated list as loaded from disk.
///
/// The parsed records sit next to the documents they came from. Writing back
/// re-emits those documents, so keys keep their order and explicit defaults
/// such as `"pre_release": false` or `"category": null` stay as written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CuratedList {
    pub apps: Vec<TrackedApp>,
    documents: Vec<serde_json::Value>,
}

impl CuratedList {
    /// Loads the list from `path`.
    ///
    /// # Errors
    ///
    /// A missing file yields [`SyncError::CuratedListNotFound`]; invalid JSON, or
    /// JSON that is not an array of app records, yields
    /// [`SyncError::CuratedListParse`]. Both are fatal for the run.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SyncError::CuratedListNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| SyncError::CuratedListParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_json(&content).map_err(|e| {
            SyncError::CuratedListParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Parses a curated list from JSON text.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        let documents: Vec<serde_json::Value> = serde_json::from_str(content)?;
        let apps = documents
            .iter()
            .map(|doc| TrackedApp::deserialize(doc))
            .collect::<serde_json::Result<Vec<TrackedApp>>>()?;
        Ok(Self {
            apps,
            documents,
        })
    }

    /// Serializes the list in the persisted format.
    pub fn to_json(&self) -> Result<String> {
        to_pretty_json(&self.documents)
    }

    /// Writes the list back atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::CatalogWrite`] if the file cannot be replaced.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(path, &self.documents).map_err(|e| {
            SyncError::CatalogWrite {
                path: path.display().to_string(),
                reason: format!("{e:#}"),
            }
            .into()
        })
    }

    /// Stores a discovered icon as the override of `(repo, name)`, but only if
    /// that entry has no override yet. Returns whether anything changed.
    pub fn set_icon_override(&mut self, repo: &str, name: &str, icon_url: &str) -> bool {
        let Some(index) = self.apps.iter().position(|a| a.is_identified_by(repo, name)) else {
            return false;
        };
        let app = &mut self.apps[index];
        if app.icon_override().is_some() {
            return false;
        }
        app.icon_url = Some(icon_url.to_string());
        if let Some(doc) = self.documents.get_mut(index).and_then(serde_json::Value::as_object_mut) {
            doc.insert("icon_url".to_string(), serde_json::Value::String(icon_url.to_string()));
        }
        true
    }
}
