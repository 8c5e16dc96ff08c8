//! Wire types for the subset of the GitHub REST API the engine reads.

use serde::{Deserialize, Serialize};

/// A published (or draft) release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamRelease {
    #[serde(rename = "tag_name")]
    pub tag: String,

    #[serde(default, rename = "draft")]
    pub is_draft: bool,

    #[serde(default, rename = "prerelease")]
    pub is_pre_release: bool,

    /// ISO-8601 timestamp; drafts may have none.
    #[serde(default)]
    pub published_at: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub assets: Vec<UpstreamAsset>,
}

impl UpstreamRelease {
    /// `published_at`, or the empty string which sorts before every date.
    #[must_use]
    pub fn published(&self) -> &str {
        self.published_at.as_deref().unwrap_or("")
    }
}

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamAsset {
    #[serde(rename = "name")]
    pub file_name: String,

    #[serde(rename = "browser_download_url")]
    pub download_url: String,

    #[serde(default, rename = "size")]
    pub size_bytes: u64,
}

/// Repository metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub default_branch: Option<String>,

    #[serde(default)]
    pub owner: Option<RepoOwner>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    #[serde(default)]
    pub login: String,

    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One path of a repository tree (or a root directory listing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,

    /// `blob` for files, `tree` for directories.
    #[serde(rename = "type")]
    pub kind: String,
}

impl TreeEntry {
    #[must_use]
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: "blob".to_string(),
        }
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == "blob"
    }
}

/// Response of `GET /repos/{repo}/git/trees/{sha}?recursive=1`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TreeResponse {
    pub tree: Vec<TreeEntry>,
}

/// One element of `GET /repos/{repo}/contents/`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<ContentEntry> for TreeEntry {
    fn from(entry: ContentEntry) -> Self {
        Self {
            path: entry.name,
            kind: if entry.kind == "file" {
                "blob".to_string()
            } else {
                "tree".to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_from_api_json() {
        let json = r#"{
            "tag_name": "v1.2.0",
            "draft": false,
            "prerelease": true,
            "published_at": "2024-06-01T12:00:00Z",
            "body": null,
            "html_url": "https://github.com/org/foo/releases/tag/v1.2.0",
            "assets": [
                {"name": "Foo.ipa", "browser_download_url": "https://dl/Foo.ipa", "size": 100, "id": 7}
            ]
        }"#;
        let release: UpstreamRelease = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag, "v1.2.0");
        assert!(release.is_pre_release);
        assert_eq!(release.published(), "2024-06-01T12:00:00Z");
        assert_eq!(release.body, None);
        assert_eq!(release.assets[0].file_name, "Foo.ipa");
        assert_eq!(release.assets[0].size_bytes, 100);
    }

    #[test]
    fn test_content_entry_maps_to_tree_kind() {
        let entry: ContentEntry =
            serde_json::from_str(r#"{"name": "icon.png", "type": "file"}"#).unwrap();
        let tree: TreeEntry = entry.into();
        assert!(tree.is_file());

        let entry: ContentEntry = serde_json::from_str(r#"{"name": "src", "type": "dir"}"#).unwrap();
        assert!(!TreeEntry::from(entry).is_file());
    }
}
