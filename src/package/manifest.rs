//! Reading `Info.plist` out of an `.ipa` archive.

use regex::Regex;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::LazyLock;

use crate::core::SyncError;

/// Version reported when the manifest has no `CFBundleShortVersionString`.
pub const DEFAULT_SHORT_VERSION: &str = "0.0.0";

/// Build reported when the manifest has no `CFBundleVersion`.
pub const DEFAULT_BUILD: &str = "0";

static INFO_PLIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Payload/[^/]+\.app/Info\.plist$").expect("valid regex")
});

/// The handful of manifest fields the catalog needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub version: String,
    pub build: String,
    /// `None` when the manifest does not declare one.
    pub identifier: Option<String>,
}

fn parse_error(path: &Path, reason: impl ToString) -> SyncError {
    SyncError::PackageParse {
        name: path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        ),
        reason: reason.to_string(),
    }
}

fn string_value(dict: &plist::Dictionary, key: &str) -> Option<String> {
    match dict.get(key)? {
        plist::Value::String(s) => Some(s.clone()),
        plist::Value::Integer(i) => Some(i.to_string()),
        plist::Value::Real(r) => Some(r.to_string()),
        _ => None,
    }
}

/// Parses manifest bytes (XML or binary plist).
pub fn parse_info_plist(bytes: &[u8]) -> Result<Manifest, String> {
    let value = plist::Value::from_reader(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let dict = value.into_dictionary().ok_or("Info.plist is not a dictionary")?;

    Ok(Manifest {
        version: string_value(&dict, "CFBundleShortVersionString")
            .unwrap_or_else(|| DEFAULT_SHORT_VERSION.to_string()),
        build: string_value(&dict, "CFBundleVersion").unwrap_or_else(|| DEFAULT_BUILD.to_string()),
        identifier: string_value(&dict, "CFBundleIdentifier").filter(|s| !s.is_empty()),
    })
}

/// Reads the manifest of the first `Payload/*.app/Info.plist` member.
///
/// # Errors
///
/// [`SyncError::PackageParse`] if the file is not a zip archive, contains no
/// app manifest, or the manifest is not a property list.
pub fn read_manifest(path: &Path) -> Result<Manifest, SyncError> {
    let file = File::open(path).map_err(|e| parse_error(path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| parse_error(path, e))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| parse_error(path, e))?;
        if !INFO_PLIST.is_match(entry.name()) {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(|e| parse_error(path, e))?;
        return parse_info_plist(&bytes).map_err(|reason| parse_error(path, reason));
    }

    Err(parse_error(path, "no Payload/*.app/Info.plist in archive"))
}
