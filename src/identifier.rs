//! Bundle identifier disambiguation.
//!
//! iOS refuses to install two apps with the same bundle identifier, so every
//! flavor of a repository gets its own suffix ("com.utmapp.UTM.remote",
//! "com.example.app.nightly"). The suffix is derived from the display name
//! only, which makes [`disambiguate`] idempotent.

use crate::names::{normalize, repo_name};

/// Flavor keywords checked against the lower-cased display name, in priority order.
pub const FLAVOR_SUFFIXES: [&str; 9] =
    ["nightly", "beta", "alpha", "dev", "test", "experimental", "pre-release", "jit", "sidestore"];

/// A name remainder must be longer than this to become a suffix.
const MIN_REMAINDER_LEN: usize = 2;

fn with_suffix(identifier: &str, suffix: &str) -> String {
    if identifier.ends_with(&format!(".{suffix}")) {
        identifier.to_string()
    } else {
        format!("{identifier}.{suffix}")
    }
}

/// Appends a flavor suffix to `identifier` when `app_name` denotes a flavor.
///
/// 1. The first [`FLAVOR_SUFFIXES`] keyword contained in the display name is
///    appended as `.{keyword}`.
/// 2. Otherwise, if the display name is not just the repository name, the
///    rest of the name (repository name removed, non-alphanumerics dropped)
///    is appended when it is longer than two characters.
///
/// A suffix already at the end of `identifier` is not added again. An empty
/// identifier is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use altsync::identifier::disambiguate;
///
/// assert_eq!(disambiguate("com.utmapp.UTM", "UTM Remote", "utmapp/UTM"), "com.utmapp.UTM.remote");
/// assert_eq!(disambiguate("com.utmapp.UTM.remote", "UTM Remote", "utmapp/UTM"), "com.utmapp.UTM.remote");
/// assert_eq!(disambiguate("com.example.app", "App (Nightly)", "org/app"), "com.example.app.nightly");
/// assert_eq!(disambiguate("com.utmapp.UTM", "UTM", "utmapp/UTM"), "com.utmapp.UTM");
/// ```
#[must_use]
pub fn disambiguate(identifier: &str, app_name: &str, repo: &str) -> String {
    if identifier.is_empty() {
        return String::new();
    }

    let name_lower = app_name.to_lowercase();
    if let Some(keyword) = FLAVOR_SUFFIXES.iter().find(|k| name_lower.contains(*k)) {
        return with_suffix(identifier, keyword);
    }

    let repo_lower = repo_name(repo).to_lowercase();
    if normalize(app_name) == normalize(&repo_lower) {
        return identifier.to_string();
    }

    let remainder: String = name_lower
        .replace(&repo_lower, "")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    if remainder.len() > MIN_REMAINDER_LEN {
        with_suffix(identifier, &remainder)
    } else {
        identifier.to_string()
    }
}
