//! Test utilities for altsync
//!
//! This module provides utilities for writing tests without network access:
//! - [`FakeUpstream`] - In-memory [`Upstream`] serving canned releases, trees and files
//! - [`fixtures`] - Builders for `.ipa` archives, PNG icons and release records
//! - [`init_test_logging`] - One-time tracing setup for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use altsync::test_utils::{FakeUpstream, fixtures};
//!
//! let upstream = FakeUpstream::new()
//!     .with_releases("org/foo", vec![fixtures::release("v1.0.0", false, "2024-06-01", vec![
//!         fixtures::asset("Foo.ipa", 100),
//!     ])])
//!     .with_file(
//!         "https://github.com/downloads/Foo.ipa",
//!         fixtures::build_ipa("Foo", "1.0.0", "1", "com.org.foo"),
//!     );
//! ```

pub mod fixtures;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::upstream::{Fetch, RepoInfo, RepoOwner, TreeEntry, Upstream, UpstreamRelease};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests stay silent.
///
/// ```bash
/// RUST_LOG=altsync=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_ansi(true)
            .try_init();
    });
}

const OUTAGE: &str = "simulated outage";

/// In-memory release host.
///
/// Unknown repositories and URLs answer [`Fetch::Missing`]; keys registered
/// with [`FakeUpstream::with_outage`] answer [`Fetch::Unavailable`]. Every
/// download is recorded with its destination path.
#[derive(Debug, Default)]
pub struct FakeUpstream {
    releases: HashMap<String, Vec<UpstreamRelease>>,
    repo_info: HashMap<String, RepoInfo>,
    trees: HashMap<String, Vec<TreeEntry>>,
    root_contents: HashMap<String, Vec<TreeEntry>>,
    files: HashMap<String, Vec<u8>>,
    outages: HashSet<String>,
    downloads: Mutex<Vec<(String, PathBuf)>>,
    fetches: Mutex<Vec<String>>,
}

impl FakeUpstream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_releases(mut self, repo: &str, releases: Vec<UpstreamRelease>) -> Self {
        self.releases.insert(repo.to_string(), releases);
        self
    }

    #[must_use]
    pub fn with_repo_info(mut self, repo: &str, description: Option<&str>, default_branch: &str) -> Self {
        let owner = crate::names::repo_owner(repo);
        self.repo_info.insert(
            repo.to_string(),
            RepoInfo {
                description: description.map(str::to_string),
                default_branch: Some(default_branch.to_string()),
                owner: Some(RepoOwner {
                    login: owner.to_string(),
                    avatar_url: Some(format!("https://avatars.example.com/{owner}.png")),
                }),
            },
        );
        self
    }

    /// Registers the recursive tree of `repo`; every path is a file.
    #[must_use]
    pub fn with_tree(mut self, repo: &str, paths: &[&str]) -> Self {
        self.trees.insert(repo.to_string(), paths.iter().map(|p| TreeEntry::blob(*p)).collect());
        self
    }

    #[must_use]
    pub fn with_root_contents(mut self, repo: &str, paths: &[&str]) -> Self {
        self.root_contents.insert(repo.to_string(), paths.iter().map(|p| TreeEntry::blob(*p)).collect());
        self
    }

    /// Serves `bytes` at `url`, both for downloads and byte fetches.
    #[must_use]
    pub fn with_file(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), bytes);
        self
    }

    /// Makes every call keyed by `key` (repository or URL) unavailable.
    #[must_use]
    pub fn with_outage(mut self, key: &str) -> Self {
        self.outages.insert(key.to_string());
        self
    }

    /// URLs downloaded so far, with their destination paths.
    pub fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// URLs fetched as bytes so far.
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().map(|f| f.clone()).unwrap_or_default()
    }

    fn lookup<T: Clone>(&self, key: &str, table: &HashMap<String, T>) -> Fetch<T> {
        if self.outages.contains(key) {
            return Fetch::Unavailable(OUTAGE.to_string());
        }
        table.get(key).cloned().map_or(Fetch::Missing, Fetch::Found)
    }
}

impl Upstream for FakeUpstream {
    async fn releases(&self, repo: &str) -> Fetch<Vec<UpstreamRelease>> {
        self.lookup(repo, &self.releases)
    }

    async fn repo_info(&self, repo: &str) -> Fetch<RepoInfo> {
        self.lookup(repo, &self.repo_info)
    }

    async fn tree(&self, repo: &str) -> Fetch<Vec<TreeEntry>> {
        self.lookup(repo, &self.trees)
    }

    async fn root_contents(&self, repo: &str) -> Fetch<Vec<TreeEntry>> {
        self.lookup(repo, &self.root_contents)
    }

    async fn fetch_bytes(&self, url: &str) -> Fetch<Vec<u8>> {
        if let Ok(mut fetches) = self.fetches.lock() {
            fetches.push(url.to_string());
        }
        self.lookup(url, &self.files)
    }

    async fn download(&self, url: &str, dest: &Path) -> Fetch<u64> {
        if let Ok(mut downloads) = self.downloads.lock() {
            downloads.push((url.to_string(), dest.to_path_buf()));
        }
        match self.lookup(url, &self.files) {
            Fetch::Found(bytes) => match std::fs::write(dest, &bytes) {
                Ok(()) => Fetch::Found(bytes.len() as u64),
                Err(e) => Fetch::Unavailable(e.to_string()),
            },
            Fetch::Missing => Fetch::Missing,
            Fetch::Unavailable(reason) => Fetch::Unavailable(reason),
        }
    }

    fn raw_url(&self, repo: &str, branch: &str, path: &str) -> String {
        format!("https://raw.example.com/{repo}/{branch}/{path}")
    }
}
