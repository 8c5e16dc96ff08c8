//! Downloading and inspecting release packages.
//!
//! A package is downloaded into a scoped temporary file, hashed and opened to
//! read its manifest. The temporary file is removed when the [`NamedTempFile`]
//! guard drops, whichever way [`fetch_package`] returns.

pub mod manifest;

use anyhow::{Context, Result, anyhow};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::constants::{PACKAGE_EXTENSION, PLACEHOLDER_IDENTIFIER_PREFIX};
use crate::core::SyncError;
use crate::upstream::{Fetch, Upstream, UpstreamAsset};
pub use manifest::{Manifest, read_manifest};

/// What the catalog records about one downloaded package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub version: String,
    /// `None` when the manifest could not be read.
    pub build: Option<String>,
    pub identifier: String,
    /// Lower-case hex SHA-256 of the downloaded bytes.
    pub sha256: String,
}

/// Identifier used when the package does not declare one.
///
/// # Examples
///
/// ```rust
/// use altsync::package::placeholder_identifier;
///
/// assert_eq!(placeholder_identifier("My Cool App"), "com.placeholder.mycoolapp");
/// ```
#[must_use]
pub fn placeholder_identifier(app_name: &str) -> String {
    format!("{PLACEHOLDER_IDENTIFIER_PREFIX}{}", app_name.to_lowercase().replace(' ', ""))
}

/// Version derived from a release tag ("v1.2.3" -> "1.2.3").
#[must_use]
pub fn version_from_tag(tag: &str) -> String {
    tag.trim_start_matches('v').to_string()
}

/// Streams a file through SHA-256.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("Cannot read file for checksum calculation: {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hashes the package and reads its manifest, falling back to the release tag
/// and a placeholder identifier when the manifest is unusable.
pub fn inspect_package(path: &Path, app_name: &str, tag: &str) -> Result<PackageInfo> {
    let sha256 = sha256_file(path)?;

    let info = match read_manifest(path) {
        Ok(manifest) if !manifest.version.is_empty() => PackageInfo {
            version: manifest.version,
            build: Some(manifest.build),
            identifier: manifest.identifier.unwrap_or_else(|| placeholder_identifier(app_name)),
            sha256,
        },
        Ok(_) => {
            warn!("Empty version in manifest for {app_name}, using fallback.");
            fallback_info(app_name, tag, sha256)
        }
        Err(e) => {
            warn!("Failed to parse IPA metadata for {app_name}, using fallback: {e}");
            fallback_info(app_name, tag, sha256)
        }
    };
    Ok(info)
}

fn fallback_info(app_name: &str, tag: &str, sha256: String) -> PackageInfo {
    PackageInfo {
        version: version_from_tag(tag),
        build: None,
        identifier: placeholder_identifier(app_name),
        sha256,
    }
}

/// Downloads `asset` and inspects it.
///
/// # Errors
///
/// [`SyncError::Download`] if the asset cannot be retrieved, or an I/O error
/// while hashing. Both abort processing of this app only.
pub async fn fetch_package<U: Upstream>(
    upstream: &U,
    asset: &UpstreamAsset,
    app_name: &str,
    tag: &str,
) -> Result<PackageInfo> {
    let temp = tempfile::Builder::new()
        .prefix("altsync-")
        .suffix(PACKAGE_EXTENSION)
        .tempfile()
        .context("Failed to create temporary file for download")?;

    download_into(upstream, &asset.download_url, &temp).await?;

    let path: PathBuf = temp.path().to_path_buf();
    let app_name = app_name.to_string();
    let tag = tag.to_string();
    let info = tokio::task::spawn_blocking(move || inspect_package(&path, &app_name, &tag))
        .await
        .map_err(|e| anyhow!("Task join error during package inspection: {e}"))??;

    // `temp` drops here and removes the file.
    drop(temp);
    Ok(info)
}

async fn download_into<U: Upstream>(upstream: &U, url: &str, temp: &NamedTempFile) -> Result<()> {
    match upstream.download(url, temp.path()).await {
        Fetch::Found(bytes) => {
            debug!("Downloaded {bytes} bytes from {url}");
            Ok(())
        }
        Fetch::Missing => Err(SyncError::Download {
            url: url.to_string(),
            reason: "HTTP 404 Not Found".to_string(),
        }
        .into()),
        Fetch::Unavailable(reason) => Err(SyncError::Download {
            url: url.to_string(),
            reason,
        }
        .into()),
    }
}
