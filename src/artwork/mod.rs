//! App artwork: icon discovery and tint derivation.
//!
//! - [`icon`] - Ranks image files in a repository and checks squareness
//! - [`color`] - Derives a tint from the dominant colour of an icon
//!
//! The two modules deliberately disagree about failures: an icon that cannot be
//! fetched or decoded is assumed to be square, while the same failure yields no
//! tint at all.

pub mod color;
pub mod icon;

pub use color::{dominant_color, dominant_color_from_bytes};
pub use icon::{IconCandidate, choose_icon, discover_icons, is_square, score_path};

/// Whether `url` can be fetched at all.
fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
