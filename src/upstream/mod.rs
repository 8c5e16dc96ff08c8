//! Access to the code-hosting API that publishes releases.
//!
//! The reconciler never talks HTTP directly. It is generic over the
//! [`Upstream`] trait, implemented for production by [`GitHubClient`] and in
//! tests by an in-memory fake. Every call returns a [`Fetch`] instead of an
//! error: transport problems are absorbed at the call site and surface as
//! [`Fetch::Unavailable`].

mod github;
mod retry;
pub mod types;

pub use github::{GitHubClient, GitHubEndpoints};
pub use retry::RetryPolicy;
pub use types::{RepoInfo, RepoOwner, TreeEntry, UpstreamAsset, UpstreamRelease};

use std::future::Future;
use std::path::Path;

/// Outcome of a best-effort remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch<T> {
    /// The resource was retrieved.
    Found(T),
    /// The server answered that the resource does not exist (HTTP 404).
    Missing,
    /// Transport failure, unexpected status, exhausted retries or an undecodable body.
    Unavailable(String),
}

impl<T> Fetch<T> {
    /// The value, if one was retrieved. "Missing" and "unavailable" both map to `None`.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing | Self::Unavailable(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetch<U> {
        match self {
            Self::Found(value) => Fetch::Found(f(value)),
            Self::Missing => Fetch::Missing,
            Self::Unavailable(reason) => Fetch::Unavailable(reason),
        }
    }
}

/// Queries the reconciler needs from the release host.
///
/// Implementations must not panic or return transport errors; anything that
/// goes wrong becomes [`Fetch::Missing`] or [`Fetch::Unavailable`].
pub trait Upstream {
    /// All releases of `repo`, in the order the host lists them.
    fn releases(&self, repo: &str) -> impl Future<Output = Fetch<Vec<UpstreamRelease>>> + Send;

    /// Repository metadata (description, default branch, owner avatar).
    fn repo_info(&self, repo: &str) -> impl Future<Output = Fetch<RepoInfo>> + Send;

    /// Recursive file tree of the default branch head.
    fn tree(&self, repo: &str) -> impl Future<Output = Fetch<Vec<TreeEntry>>> + Send;

    /// Root directory listing only; fallback when the tree is unavailable.
    fn root_contents(&self, repo: &str) -> impl Future<Output = Fetch<Vec<TreeEntry>>> + Send;

    /// Raw bytes of a (small) file such as an icon.
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Fetch<Vec<u8>>> + Send;

    /// Streams `url` into `dest` and returns the number of bytes written.
    fn download(&self, url: &str, dest: &Path) -> impl Future<Output = Fetch<u64>> + Send;

    /// URL of a file in the repository at `branch`.
    fn raw_url(&self, repo: &str, branch: &str, path: &str) -> String;
}
