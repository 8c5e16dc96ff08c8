//! Release selection.

use super::user_pattern;
use crate::upstream::UpstreamRelease;
use tracing::debug;

/// Picks the release to publish from `releases`.
///
/// Drafts are ignored. With a `tag_filter`, only releases whose tag matches
/// (case-insensitive search) stay; an invalid filter is logged and ignored.
/// Candidates are ordered newest first by `published_at`, ties keeping the
/// order the host listed them in.
///
/// - `prefer_pre_release == false`: the newest stable release, else the newest
///   release of any kind.
/// - `prefer_pre_release == true`: the newest pre-release, unless a stable
///   release was published at the same time or later; then that stable release.
///
/// # Examples
///
/// ```rust
/// use altsync::resolver::resolve_release;
/// # use altsync::upstream::UpstreamRelease;
/// # fn release(tag: &str, pre: bool, date: &str) -> UpstreamRelease {
/// #     UpstreamRelease { tag: tag.into(), is_draft: false, is_pre_release: pre,
/// #         published_at: Some(date.into()), body: None, assets: vec![] }
/// # }
///
/// let releases = vec![
///     release("v2.0.0-beta", true, "2024-06-01T00:00:00Z"),
///     release("v1.0.0", false, "2024-01-01T00:00:00Z"),
/// ];
/// assert_eq!(resolve_release(&releases, true, None).unwrap().tag, "v2.0.0-beta");
/// assert_eq!(resolve_release(&releases, false, None).unwrap().tag, "v1.0.0");
/// ```
#[must_use]
pub fn resolve_release(
    releases: &[UpstreamRelease],
    prefer_pre_release: bool,
    tag_filter: Option<&str>,
) -> Option<UpstreamRelease> {
    let mut candidates: Vec<&UpstreamRelease> = releases.iter().filter(|r| !r.is_draft).collect();

    if let Some(regex) = tag_filter.and_then(|p| user_pattern("tag_regex", p)) {
        candidates.retain(|r| regex.is_match(&r.tag));
        if candidates.is_empty() {
            debug!("No release tag matches '{}'", regex.as_str());
        }
    }

    // Stable sort: equal timestamps keep upstream order.
    candidates.sort_by(|a, b| b.published().cmp(a.published()));

    let newest_stable = candidates.iter().find(|r| !r.is_pre_release).copied();
    let newest_pre = candidates.iter().find(|r| r.is_pre_release).copied();

    let chosen = if prefer_pre_release {
        match (newest_pre, newest_stable) {
            (Some(pre), Some(stable)) if stable.published() >= pre.published() => Some(stable),
            (Some(pre), _) => Some(pre),
            (None, stable) => stable,
        }
    } else {
        newest_stable.or_else(|| candidates.first().copied())
    };

    chosen.cloned()
}
