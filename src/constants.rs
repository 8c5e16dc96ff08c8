//! Global constants used throughout the altsync codebase.
//!
//! This module contains timeout durations, retry parameters, and other
//! values that are used across multiple modules. Heuristic weights live
//! next to the scoring functions that use them.

use std::time::Duration;

/// Timeout for GitHub API JSON requests (15 seconds).
pub const API_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for fetching icon images (10 seconds).
///
/// Used by both the squareness check and the colour extractor.
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for downloading a release asset (5 minutes).
///
/// Packages can be several hundred megabytes, so this is deliberately long.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Number of retries after the first attempt for transient HTTP failures.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// First backoff delay in milliseconds; doubles on every retry (1s, 2s, 4s).
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Upper bound for a single backoff delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// HTTP status codes that are retried automatically.
pub const TRANSIENT_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Default GitHub REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default base URL for raw repository content.
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("altsync/", env!("CARGO_PKG_VERSION"));

/// Branch assumed when repository info does not report a default branch.
pub const FALLBACK_BRANCH: &str = "main";

/// Neutral tint used when no colour can be derived from the icon.
pub const DEFAULT_TINT: &str = "#000000";

/// File extension of the distributed package (compared case-insensitively).
pub const PACKAGE_EXTENSION: &str = ".ipa";

/// Prefix of the identifier used when a package manifest cannot be read.
pub const PLACEHOLDER_IDENTIFIER_PREFIX: &str = "com.placeholder.";

/// Catalog description used when the repository has none.
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

/// Version notes used when a release has an empty body.
pub const DEFAULT_VERSION_NOTES: &str = "Update";

/// Override values that human editors leave behind and that mean "unset".
pub const PLACEHOLDER_OVERRIDES: [&str; 3] = ["", "none", "_no response_"];
