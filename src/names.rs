//! Canonical name comparison.
//!
//! Release assets, display names and repository names are written by different
//! people with different separator habits ("UTM-HV", "UTM HV", "UTM_HV"). All
//! heuristics compare names through [`normalize`] so those spellings collide.

/// Lower-cases `s` and drops every character that is not alphanumeric.
///
/// Spaces, hyphens, underscores, dots and other punctuation all disappear, so
/// the result only contains the "letters that matter".
///
/// # Examples
///
/// ```rust
/// use altsync::names::normalize;
///
/// assert_eq!(normalize("UTM-HV"), "utmhv");
/// assert_eq!(normalize("UTM HV"), normalize("UTM_HV"));
/// ```
#[must_use]
pub fn normalize(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

/// Returns the last `/`-separated segment of a repository slug.
#[must_use]
pub fn repo_name(slug: &str) -> &str {
    slug.rsplit('/').next().unwrap_or(slug)
}

/// Returns the owner part of a repository slug.
#[must_use]
pub fn repo_owner(slug: &str) -> &str {
    slug.split('/').next().unwrap_or(slug)
}
