//! Icon discovery.
//!
//! Repositories rarely say which image is their app icon, so candidates are
//! ranked by path: Xcode asset catalogs first, then iOS folders, generic asset
//! folders and public web folders, with file names containing "icon", "logo"
//! or "app" promoted and Android or toolbar artwork demoted.

use std::io::Cursor;
use tracing::{debug, info, warn};

use super::is_http_url;
use crate::constants::FALLBACK_BRANCH;
use crate::upstream::{Fetch, TreeEntry, Upstream};

/// Path lies inside an Xcode `AppIcon.appiconset`.
pub const APPICONSET_WEIGHT: i32 = 100;
/// Path lies under an `ios/` folder.
pub const IOS_FOLDER_WEIGHT: i32 = 50;
/// Path lies under an `assets/` folder.
pub const ASSETS_FOLDER_WEIGHT: i32 = 20;
/// Path lies under a `public/` folder.
pub const PUBLIC_FOLDER_WEIGHT: i32 = 10;

/// File name contains "icon".
pub const ICON_NAME_WEIGHT: i32 = 30;
/// File name contains "logo".
pub const LOGO_NAME_WEIGHT: i32 = 20;
/// File name contains "app".
pub const APP_NAME_WEIGHT: i32 = 10;

pub const RES_1024_WEIGHT: i32 = 15;
pub const RES_512_WEIGHT: i32 = 10;
pub const RES_120_WEIGHT: i32 = 5;

/// Path mentions Android.
pub const ANDROID_PENALTY: i32 = -50;
/// File name contains "small".
pub const SMALL_PENALTY: i32 = -10;
/// File name contains "toolbar".
pub const TOOLBAR_PENALTY: i32 = -20;

/// Largest accepted deviation of width/height from 1.0.
pub const SQUARE_TOLERANCE: f64 = 0.05;

/// Image file extensions considered for icons.
pub const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".webp", ".svg"];

/// A ranked icon URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconCandidate {
    pub url: String,
    pub score: i32,
}

/// Scores a repository path or icon URL; higher is more icon-like.
///
/// Folder and file-name bonuses are exclusive within their group (the first
/// matching rule counts), penalties add up.
///
/// # Examples
///
/// ```rust
/// use altsync::artwork::score_path;
///
/// let appiconset = score_path("ios/Assets.xcassets/AppIcon.appiconset/Icon-1024.png");
/// let android = score_path("android/app/src/main/res/mipmap/ic_launcher.png");
/// assert!(appiconset > android);
/// assert!(android < 0);
/// ```
#[must_use]
pub fn score_path(path: &str) -> i32 {
    let path = path.to_lowercase();
    let name = path.rsplit('/').next().unwrap_or(&path);
    let mut score = 0;

    if path.contains("appicon.appiconset") {
        score += APPICONSET_WEIGHT;
    } else if path.contains("ios/") {
        score += IOS_FOLDER_WEIGHT;
    } else if path.contains("assets/") {
        score += ASSETS_FOLDER_WEIGHT;
    } else if path.contains("public/") {
        score += PUBLIC_FOLDER_WEIGHT;
    }

    if name.contains("icon") {
        score += ICON_NAME_WEIGHT;
    } else if name.contains("logo") {
        score += LOGO_NAME_WEIGHT;
    } else if name.contains("app") {
        score += APP_NAME_WEIGHT;
    }

    if name.contains("1024") {
        score += RES_1024_WEIGHT;
    } else if name.contains("512") {
        score += RES_512_WEIGHT;
    } else if name.contains("120") {
        score += RES_120_WEIGHT;
    }

    if path.contains("android") {
        score += ANDROID_PENALTY;
    }
    if name.contains("small") {
        score += SMALL_PENALTY;
    }
    if name.contains("toolbar") {
        score += TOOLBAR_PENALTY;
    }

    score
}

fn is_image(path: &str) -> bool {
    let lower = path.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Positive-scoring image paths, best first. Ties keep tree order.
#[must_use]
pub fn rank_paths(entries: &[TreeEntry]) -> Vec<(i32, &str)> {
    let mut ranked: Vec<(i32, &str)> = entries
        .iter()
        .filter(|e| e.is_file() && is_image(&e.path))
        .map(|e| (score_path(&e.path), e.path.as_str()))
        .filter(|(score, _)| *score > 0)
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked
}

/// Ranked icon candidates for `repo`.
///
/// Reads the recursive tree of the default branch, or only the root listing
/// when the tree is unavailable. If no path qualifies, the owner's avatar is
/// the sole candidate. Empty only when even the avatar is unknown.
pub async fn discover_icons<U: Upstream>(upstream: &U, repo: &str) -> Vec<IconCandidate> {
    info!("Searching for icon in {repo}...");

    let entries = match upstream.tree(repo).await {
        Fetch::Found(entries) => entries,
        other => {
            debug!("Tree unavailable for {repo} ({other:?}), reading root listing");
            upstream.root_contents(repo).await.found().unwrap_or_default()
        }
    };

    let ranked = rank_paths(&entries);
    let info = upstream.repo_info(repo).await.found().unwrap_or_default();

    if ranked.is_empty() {
        let avatar = info.owner.and_then(|o| o.avatar_url).filter(|u| !u.is_empty());
        return match avatar {
            Some(url) => {
                debug!("No icon in {repo}, using owner avatar");
                let score = score_path(&url);
                vec![IconCandidate {
                    url,
                    score,
                }]
            }
            None => {
                warn!("No icon candidates found for {repo}");
                Vec::new()
            }
        };
    }

    let branch = info.default_branch.as_deref().unwrap_or(FALLBACK_BRANCH);
    let candidates: Vec<IconCandidate> = ranked
        .into_iter()
        .map(|(score, path)| IconCandidate {
            url: upstream.raw_url(repo, branch, path),
            score,
        })
        .collect();

    debug!("Best icon candidate: {} (Score: {})", candidates[0].url, candidates[0].score);
    candidates
}

/// Reads image dimensions from encoded bytes.
fn dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes)).with_guessed_format().ok()?.into_dimensions().ok()
}

/// Whether an aspect ratio is within [`SQUARE_TOLERANCE`] of 1:1.
#[must_use]
pub fn is_square_dimensions(width: u32, height: u32) -> bool {
    if height == 0 {
        return false;
    }
    let ratio = f64::from(width) / f64::from(height);
    (1.0 - SQUARE_TOLERANCE..=1.0 + SQUARE_TOLERANCE).contains(&ratio)
}

/// Whether the image at `url` is (roughly) square.
///
/// Optimistic: if the image cannot be fetched or decoded it is assumed to be
/// square. A URL that is not http(s) is never square.
pub async fn is_square<U: Upstream>(upstream: &U, url: &str) -> bool {
    if !is_http_url(url) {
        return false;
    }
    let bytes = match upstream.fetch_bytes(url).await {
        Fetch::Found(bytes) => bytes,
        other => {
            warn!("Could not check aspect ratio for {url}: {other:?}");
            return true;
        }
    };
    match dimensions(&bytes) {
        Some((width, height)) => is_square_dimensions(width, height),
        None => {
            warn!("Could not check aspect ratio for {url}: undecodable image");
            true
        }
    }
}

/// The first square candidate, or the top-ranked one if none is square.
pub async fn choose_icon<U: Upstream>(upstream: &U, candidates: &[IconCandidate]) -> Option<IconCandidate> {
    for candidate in candidates {
        if is_square(upstream, &candidate.url).await {
            return Some(candidate.clone());
        }
    }
    let fallback = candidates.first().cloned();
    if let Some(c) = &fallback {
        warn!("No square icon found, using best candidate: {}", c.url);
    }
    fallback
}
