//! altsync - catalog synchronization for sideloading app sources
//!
//! Keeps an AltStore-style source catalog (`source.json`) in sync with the
//! latest GitHub releases of a human-curated list of repositories
//! (`apps.json`). Each run resolves the newest suitable release and `.ipa`
//! asset per tracked app, downloads new builds to read their version and
//! bundle identifier, refreshes icons and tint colours, and writes the catalog
//! atomically.
//!
//! # Architecture Overview
//!
//! - The curated list is the input and is owned by people
//! - The catalog is the output; its version history is append-only
//! - Everything remote goes through the [`upstream::Upstream`] trait, so the
//!   reconciler runs unchanged against GitHub or an in-memory fake
//! - Per-app failures are logged and counted; only curated-list, configuration
//!   and write failures abort a run
//!
//! # Core Modules
//!
//! ## Orchestration
//! - [`sync`] - The reconciler: matching, refresh, version detection, pruning
//! - [`cli`] - Command-line interface (`sync`, `validate`)
//! - [`config`] - `altsync.toml` catalog targets and client settings
//!
//! ## Documents
//! - [`curated`] - Tracked apps, overrides and boundary validation
//! - [`catalog`] - The persisted catalog, entries and version records
//!
//! ## Heuristics
//! - [`resolver`] - Release and asset selection
//! - [`artwork`] - Icon discovery and scoring, dominant colour extraction
//! - [`identifier`] - Bundle identifier disambiguation for flavors
//! - [`names`] - Separator-insensitive name comparison
//!
//! ## Supporting Modules
//! - [`upstream`] - GitHub client with retries, `Fetch` results, wire types
//! - [`package`] - Scoped `.ipa` download, SHA-256, `Info.plist` extraction
//! - [`core`] - Error types and user-facing error reporting
//! - [`utils`] - Atomic file writes and JSON helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use altsync::config::{CatalogTarget, SyncConfig};
//! use altsync::sync::Reconciler;
//! use altsync::upstream::GitHubClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SyncConfig::default();
//! let client = GitHubClient::new(config.github, config.retry, std::env::var("GITHUB_TOKEN").ok())?;
//! let target = CatalogTarget {
//!     name: "Example Source".to_string(),
//!     identifier: "io.example.source".to_string(),
//!     curated_list: "apps.json".into(),
//!     catalog: "source.json".into(),
//! };
//!
//! let report = Reconciler::new(&client, config.sync).sync_catalog(&target).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

// Orchestration
pub mod cli;
pub mod config;
pub mod sync;

// Documents
pub mod catalog;
pub mod curated;

// Heuristics
pub mod artwork;
pub mod identifier;
pub mod names;
pub mod resolver;

// Supporting modules
pub mod constants;
pub mod core;
pub mod package;
pub mod upstream;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
