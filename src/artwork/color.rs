//! Tint colour extraction.

use image::imageops::{self, FilterType};
use std::collections::BTreeMap;
use tracing::warn;

use super::is_http_url;
use crate::upstream::{Fetch, Upstream};

/// Edge of the square grid the image is resampled to before counting.
pub const SAMPLE_GRID: u32 = 100;

/// Pixels with alpha below this are ignored.
pub const MIN_ALPHA: u8 = 10;

/// Pixels with every channel above this are "white" and ignored.
pub const WHITE_THRESHOLD: u8 = 240;

/// Pixels with every channel below this are "black" and ignored.
pub const BLACK_THRESHOLD: u8 = 15;

fn is_eligible([r, g, b, a]: [u8; 4]) -> bool {
    if a < MIN_ALPHA {
        return false;
    }
    let white = r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD;
    let black = r < BLACK_THRESHOLD && g < BLACK_THRESHOLD && b < BLACK_THRESHOLD;
    !white && !black
}

/// Most frequent eligible colour of an encoded image as `#RRGGBB`.
///
/// `None` if the bytes do not decode or every pixel is transparent, white or
/// black. When several colours are equally frequent the lowest RGBA value wins.
#[must_use]
pub fn dominant_color_from_bytes(bytes: &[u8]) -> Option<String> {
    let decoded = image::load_from_memory(bytes).ok()?.to_rgba8();
    let grid = imageops::resize(&decoded, SAMPLE_GRID, SAMPLE_GRID, FilterType::CatmullRom);

    let mut counts: BTreeMap<[u8; 4], u32> = BTreeMap::new();
    for pixel in grid.pixels() {
        if is_eligible(pixel.0) {
            *counts.entry(pixel.0).or_default() += 1;
        }
    }

    let mut dominant: Option<([u8; 4], u32)> = None;
    for (color, count) in counts {
        if dominant.is_none_or(|(_, best)| count > best) {
            dominant = Some((color, count));
        }
    }

    dominant.map(|([r, g, b, _], _)| format!("#{r:02X}{g:02X}{b:02X}"))
}

/// Dominant colour of the image at `url`, or `None` if it cannot be fetched
/// or decoded.
pub async fn dominant_color<U: Upstream>(upstream: &U, url: &str) -> Option<String> {
    if !is_http_url(url) {
        return None;
    }
    match upstream.fetch_bytes(url).await {
        Fetch::Found(bytes) => {
            let color = dominant_color_from_bytes(&bytes);
            if color.is_none() {
                warn!("Could not extract color from {url}");
            }
            color
        }
        other => {
            warn!("Could not extract color from {url}: {other:?}");
            None
        }
    }
}
