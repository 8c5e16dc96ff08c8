//! JSON document helpers shared by the curated list and the catalog.

use super::atomic::atomic_write;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Serializes `value` the way every persisted document is written: two-space
/// indentation, non-ASCII kept verbatim, trailing newline.
///
/// The same value always produces the same bytes.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    out.push('\n');
    Ok(out)
}

/// Writes `value` to `path` atomically as pretty JSON.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = to_pretty_json(value)?;
    atomic_write(path, content.as_bytes())
}
