//! Pruning stale entries and ordering the catalog like the curated list.

use std::collections::HashSet;
use tracing::info;

use super::{Catalog, CatalogEntry};
use crate::curated::TrackedApp;
use crate::names::repo_owner;

impl Catalog {
    /// Removes entries that the curated list no longer tracks.
    ///
    /// An entry with a repository slug survives while that repository appears in
    /// `apps`. A legacy entry without a slug survives while its
    /// `(developerName, name)` pair matches `(owner, name)` of some tracked app.
    /// Returns the number of entries removed.
    pub fn prune(&mut self, apps: &[TrackedApp]) -> usize {
        let repos: HashSet<&str> = apps.iter().map(|a| a.repo.as_str()).collect();

        let before = self.apps.len();
        self.apps.retain(|entry| {
            let keep = match entry.repo_slug.as_deref() {
                Some(repo) => repos.contains(repo),
                None => apps
                    .iter()
                    .any(|a| repo_owner(&a.repo) == entry.developer_name && a.name == entry.name),
            };
            if !keep {
                info!("Removing {} from catalog (no longer tracked)", entry.name);
            }
            keep
        });
        before - self.apps.len()
    }

    /// Orders entries by their position in the curated list.
    ///
    /// The key is the index of the entry's exact `(repo, name)` pair, or the first
    /// index of its repository when the name is unknown. Entries without a key
    /// go last. The sort is stable, so ties keep their current order.
    pub fn sort_by_curated(&mut self, apps: &[TrackedApp]) {
        let key = |entry: &CatalogEntry| -> usize {
            let Some(repo) = entry.repo_slug.as_deref() else {
                return usize::MAX;
            };
            apps.iter()
                .position(|a| a.is_identified_by(repo, &entry.name))
                .or_else(|| apps.iter().position(|a| a.repo == repo))
                .unwrap_or(usize::MAX)
        };

        self.apps.sort_by_key(key);
    }
}
