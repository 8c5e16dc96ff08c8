//! Asset selection within a release.
//!
//! Repositories that ship several flavors from one release ("UTM.ipa",
//! "UTM-HV.ipa", "UTM-SE.ipa") need a rule for which file belongs to which
//! tracked app. The tiers below run in order and the first one that produces
//! an answer wins.

use super::user_pattern;
use crate::constants::PACKAGE_EXTENSION;
use crate::names::{normalize, repo_name};
use crate::upstream::UpstreamAsset;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::debug;

/// Normalized app name is contained in the normalized asset name.
pub const APP_NAME_IN_ASSET_WEIGHT: i32 = 10;

/// Normalized asset name is contained in the normalized app name.
pub const ASSET_IN_APP_NAME_WEIGHT: i32 = 5;

/// Per flavor keyword found in the raw asset name.
pub const FLAVOR_KEYWORD_WEIGHT: i32 = 20;

/// Minimum length of a flavor keyword.
const MIN_KEYWORD_LEN: usize = 3;

/// Markers of alternate builds; an asset carrying one is not the default flavor.
pub const FLAVOR_SUFFIX_MARKERS: [&str; 7] =
    ["-remote", "-hv", "-se", "-jailbroken", "-macos", "-linux", "-windows"];

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.*?\)").expect("valid regex"));

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9]{3,}").expect("valid regex"));

/// Whether `file_name` has the package extension (case-insensitive).
#[must_use]
pub fn is_package(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(PACKAGE_EXTENSION)
}

/// File name without its last extension.
fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}

fn tokens(s: &str) -> BTreeSet<String> {
    TOKEN.find_iter(&s.to_lowercase()).map(|m| m.as_str().to_string()).collect()
}

/// Words of the display name that say which flavor this is.
///
/// For "LiveContainer + SideStore" tracking `LiveContainer/LiveContainer` this
/// is `{"sidestore"}`. A trailing "(Nightly)" style note is not a flavor word.
#[must_use]
pub fn flavor_keywords(app_name: &str, repo: &str) -> BTreeSet<String> {
    let cleaned = PARENTHETICAL.replace_all(app_name, "");
    let repo_tokens = tokens(repo);
    tokens(&cleaned)
        .into_iter()
        .filter(|t| t.len() >= MIN_KEYWORD_LEN && !repo_tokens.contains(t))
        .collect()
}

/// Fuzzy relevance of one asset to the app.
#[must_use]
pub fn fuzzy_score(file_name: &str, app_name: &str, keywords: &BTreeSet<String>) -> i32 {
    let base = base_name(file_name);
    let norm_base = normalize(base);
    let norm_app = normalize(app_name);

    let mut score = 0;
    if norm_base.contains(&norm_app) {
        score += APP_NAME_IN_ASSET_WEIGHT;
    }
    if norm_app.contains(&norm_base) {
        score += ASSET_IN_APP_NAME_WEIGHT;
    }

    let raw = base.to_lowercase();
    let hits = keywords.iter().filter(|kw| raw.contains(kw.as_str())).count();
    score + FLAVOR_KEYWORD_WEIGHT * i32::try_from(hits).unwrap_or(i32::MAX / FLAVOR_KEYWORD_WEIGHT)
}

/// Picks the package asset that belongs to the app named `app_name`.
///
/// Only assets with the package extension are considered; `None` if there
/// are none. Otherwise, first match wins:
///
/// 1. the only candidate
/// 2. the first candidate matching `asset_filter` (case-insensitive; an
///    invalid pattern is logged and this tier skipped)
/// 3. the first candidate whose normalized base name equals the normalized
///    app name or the normalized repository name
/// 4. the best positive [`fuzzy_score`], earlier candidates winning ties
/// 5. the first candidate without a [`FLAVOR_SUFFIX_MARKERS`] marker
/// 6. the first candidate
///
/// # Examples
///
/// ```rust
/// use altsync::resolver::resolve_asset;
/// # use altsync::upstream::UpstreamAsset;
/// # fn asset(name: &str) -> UpstreamAsset {
/// #     UpstreamAsset { file_name: name.into(), download_url: format!("https://dl/{name}"), size_bytes: 1 }
/// # }
///
/// let assets = vec![asset("App-Remote.ipa"), asset("App.ipa")];
/// let chosen = resolve_asset(&assets, "Something Else", "org/unrelated", None).unwrap();
/// assert_eq!(chosen.file_name, "App.ipa");
/// ```
#[must_use]
pub fn resolve_asset(
    assets: &[UpstreamAsset],
    app_name: &str,
    repo: &str,
    asset_filter: Option<&str>,
) -> Option<UpstreamAsset> {
    let candidates: Vec<&UpstreamAsset> = assets.iter().filter(|a| is_package(&a.file_name)).collect();

    match candidates.as_slice() {
        [] => return None,
        [only] => return Some((*only).clone()),
        _ => {}
    }

    if let Some(regex) = asset_filter.and_then(|p| user_pattern("ipa_regex", p)) {
        if let Some(found) = candidates.iter().find(|a| regex.is_match(&a.file_name)) {
            debug!("Asset {} matched ipa_regex", found.file_name);
            return Some((*found).clone());
        }
    }

    let app = normalize(app_name);
    let repo_base = normalize(repo_name(repo));
    if let Some(found) = candidates.iter().find(|a| {
        let base = normalize(base_name(&a.file_name));
        base == app || base == repo_base
    }) {
        return Some((*found).clone());
    }

    let keywords = flavor_keywords(app_name, repo);
    let mut best: Option<(i32, &UpstreamAsset)> = None;
    for &asset in &candidates {
        let score = fuzzy_score(&asset.file_name, app_name, &keywords);
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, asset));
        }
    }
    if let Some((score, asset)) = best {
        if score > 0 {
            debug!("Asset {} selected by fuzzy score {score}", asset.file_name);
            return Some(asset.clone());
        }
    }

    let unflavored = candidates.iter().find(|a| {
        let lower = a.file_name.to_lowercase();
        !FLAVOR_SUFFIX_MARKERS.iter().any(|m| lower.contains(m))
    });

    unflavored.or_else(|| candidates.first()).map(|a| (*a).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> UpstreamAsset {
        UpstreamAsset {
            file_name: name.to_string(),
            download_url: format!("https://dl.example.com/{name}"),
            size_bytes: 100,
        }
    }

    fn pick(names: &[&str], app: &str, repo: &str, filter: Option<&str>) -> Option<String> {
        let assets: Vec<UpstreamAsset> = names.iter().map(|n| asset(n)).collect();
        resolve_asset(&assets, app, repo, filter).map(|a| a.file_name)
    }

    #[test]
    fn test_single_candidate_wins_regardless_of_name() {
        assert_eq!(pick(&["App.ipa"], "Totally Different", "org/other", None).as_deref(), Some("App.ipa"));
        assert_eq!(
            pick(&["App.ipa", "App.dmg", "README.md"], "Other", "org/other", None).as_deref(),
            Some("App.ipa")
        );
    }

    #[test]
    fn test_no_package_assets() {
        assert_eq!(pick(&["App.dmg", "App.apk"], "App", "org/app", None), None);
        assert_eq!(pick(&[], "App", "org/app", None), None);
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(pick(&["APP.IPA", "notes.txt"], "App", "org/app", None).as_deref(), Some("APP.IPA"));
    }

    #[test]
    fn test_exclusion_filter_prefers_unflavored() {
        assert_eq!(
            pick(&["App-Remote.ipa", "App.ipa"], "Something", "org/unrelated", None).as_deref(),
            Some("App.ipa")
        );
    }

    #[test]
    fn test_asset_filter_first_match() {
        assert_eq!(
            pick(&["UTM.ipa", "UTM-HV.ipa", "UTM-SE.ipa"], "UTM", "utmapp/UTM", Some("utm-se")).as_deref(),
            Some("UTM-SE.ipa")
        );
    }

    #[test]
    fn test_invalid_asset_filter_is_skipped() {
        assert_eq!(
            pick(&["UTM-SE.ipa", "UTM.ipa"], "UTM", "utmapp/UTM", Some("[bad")).as_deref(),
            Some("UTM.ipa")
        );
    }

    #[test]
    fn test_exact_normalized_match() {
        let names = ["UTM-HV.ipa", "UTM-SE.ipa", "UTM.ipa"];
        assert_eq!(pick(&names, "UTM HV", "utmapp/UTM", None).as_deref(), Some("UTM-HV.ipa"));
        assert_eq!(pick(&names, "UTM_SE", "utmapp/UTM", None).as_deref(), Some("UTM-SE.ipa"));
        // Repository name matches too.
        assert_eq!(pick(&names, "UTM Virtual Machines", "utmapp/UTM", None).as_deref(), Some("UTM.ipa"));
    }

    #[test]
    fn test_exact_match_takes_first_hit_in_list_order() {
        // "UTM.ipa" matches the repository name before "UTM-HV.ipa" matches the
        // app name; flavors that need another file set `ipa_regex`.
        let names = ["UTM.ipa", "UTM-HV.ipa"];
        assert_eq!(pick(&names, "UTM HV", "utmapp/UTM", None).as_deref(), Some("UTM.ipa"));
        assert_eq!(pick(&names, "UTM HV", "utmapp/UTM", Some("-HV")).as_deref(), Some("UTM-HV.ipa"));
    }

    #[test]
    fn test_flavor_keywords() {
        let kws = flavor_keywords("LiveContainer + SideStore (Nightly)", "LiveContainer/LiveContainer");
        assert_eq!(kws.into_iter().collect::<Vec<_>>(), vec!["sidestore".to_string()]);
    }

    #[test]
    fn test_fuzzy_score_weights() {
        let kws = flavor_keywords("LiveContainer + SideStore", "LiveContainer/LiveContainer");
        assert_eq!(
            fuzzy_score("LiveContainer+SideStore-1.0.ipa", "LiveContainer + SideStore", &kws),
            APP_NAME_IN_ASSET_WEIGHT + FLAVOR_KEYWORD_WEIGHT
        );
        assert_eq!(
            fuzzy_score("LiveContainer.ipa", "LiveContainer + SideStore", &kws),
            ASSET_IN_APP_NAME_WEIGHT
        );
        assert_eq!(fuzzy_score("Other.ipa", "LiveContainer + SideStore", &kws), 0);
    }

    #[test]
    fn test_fuzzy_tier_uses_flavor_keywords() {
        let names = ["LiveContainer-1.0.ipa", "LiveContainer+SideStore-1.0.ipa"];
        assert_eq!(
            pick(&names, "LiveContainer + SideStore", "LiveContainer/LiveContainer", None).as_deref(),
            Some("LiveContainer+SideStore-1.0.ipa")
        );
        assert_eq!(
            pick(&names, "LiveContainer", "LiveContainer/LiveContainer", None).as_deref(),
            Some("LiveContainer-1.0.ipa")
        );
    }

    #[test]
    fn test_fuzzy_ties_keep_first() {
        assert_eq!(
            pick(&["Delta-a1.ipa", "Delta-b2.ipa"], "Delta", "org/emu", None).as_deref(),
            Some("Delta-a1.ipa")
        );
    }

    #[test]
    fn test_fallback_to_first() {
        assert_eq!(
            pick(&["X-Remote.ipa", "Y-HV.ipa"], "Unrelated", "org/unrelated", None).as_deref(),
            Some("X-Remote.ipa")
        );
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("App.ipa"), "App");
        assert_eq!(base_name("App.v2.ipa"), "App.v2");
        assert_eq!(base_name(".ipa"), ".ipa");
    }
}
