//! Boundary checks applied once when a curated list is loaded.
//!
//! Problems are reported, not fatal: an entry with a malformed repository slug
//! is skipped for the run (it would be interpolated into API URLs), while a bad
//! icon or tint override is simply ignored.

use super::TrackedApp;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

const MAX_REPO_LEN: usize = 100;

static REPO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+/[a-zA-Z0-9._-]+$").expect("valid regex"));

static TINT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex")
});

/// A problem found in one curated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The repository slug cannot be used; the entry is skipped.
    InvalidRepo {
        index: usize,
        repo: String,
        reason: &'static str,
    },
    /// The icon override is not a usable URL; it is ignored.
    InvalidIconUrl {
        index: usize,
        url: String,
        reason: &'static str,
    },
    /// The tint override is not `#RGB`/`#RRGGBB`; it is ignored.
    InvalidTint {
        index: usize,
        tint: String,
    },
    /// `(repo, name)` already appeared earlier in the list.
    Duplicate {
        index: usize,
        repo: String,
        name: String,
    },
}

impl ValidationIssue {
    /// Whether the entry must be left out of this run.
    #[must_use]
    pub const fn skips_entry(&self) -> bool {
        matches!(self, Self::InvalidRepo { .. } | Self::Duplicate { .. })
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::InvalidRepo {
                index,
                ..
            }
            | Self::InvalidIconUrl {
                index,
                ..
            }
            | Self::InvalidTint {
                index,
                ..
            }
            | Self::Duplicate {
                index,
                ..
            } => *index,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRepo {
                index,
                repo,
                reason,
            } => write!(f, "Item {index}: {reason} ('{repo}')"),
            Self::InvalidIconUrl {
                index,
                url,
                reason,
            } => write!(f, "Item {index}: {reason} ('{url}')"),
            Self::InvalidTint {
                index,
                tint,
            } => write!(f, "Item {index}: Invalid tint_color '{tint}'"),
            Self::Duplicate {
                index,
                repo,
                name,
            } => write!(f, "Item {index}: Duplicate entry for repo '{repo}' with name '{name}'"),
        }
    }
}

/// Checks a repository slug; `Err` carries the reason.
pub fn check_repo(repo: &str) -> Result<(), &'static str> {
    if repo.is_empty() {
        return Err("Repo is empty");
    }
    if repo.len() > MAX_REPO_LEN {
        return Err("Repo name too long");
    }
    if repo.contains("..") {
        return Err("Directory traversal detected");
    }
    if !REPO_PATTERN.is_match(repo) {
        return Err("Invalid format (expected Owner/Repo)");
    }
    Ok(())
}

/// Checks an icon URL; `Err` carries the reason.
pub fn check_url(url: &str) -> Result<(), &'static str> {
    let lower = url.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err("Must start with http:// or https://");
    }
    if lower.contains("localhost") || lower.contains("127.0.0.1") || lower.contains("::1") {
        return Err("Localhost URLs not allowed");
    }
    Ok(())
}

/// Validates every entry and returns the issues in list order.
#[must_use]
pub fn validate_apps(apps: &[TrackedApp]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, app) in apps.iter().enumerate() {
        match check_repo(&app.repo) {
            Err(reason) => issues.push(ValidationIssue::InvalidRepo {
                index,
                repo: app.repo.clone(),
                reason,
            }),
            Ok(()) => {
                if !seen.insert((app.repo.to_lowercase(), app.name.to_lowercase())) {
                    issues.push(ValidationIssue::Duplicate {
                        index,
                        repo: app.repo.clone(),
                        name: app.name.clone(),
                    });
                }
            }
        }

        if let Some(url) = app.icon_override() {
            if let Err(reason) = check_url(url) {
                issues.push(ValidationIssue::InvalidIconUrl {
                    index,
                    url: url.to_string(),
                    reason,
                });
            }
        }

        if let Some(tint) = app.tint_override() {
            if !TINT_PATTERN.is_match(tint) {
                issues.push(ValidationIssue::InvalidTint {
                    index,
                    tint: tint.to_string(),
                });
            }
        }
    }

    issues
}
