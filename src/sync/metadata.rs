//! Artwork and identity metadata of catalog entries.

use tracing::{debug, info};

use super::Reconciler;
use crate::artwork::{choose_icon, discover_icons, dominant_color, is_square, score_path};
use crate::catalog::CatalogEntry;
use crate::curated::TrackedApp;
use crate::identifier::disambiguate;
use crate::upstream::Upstream;

impl<U: Upstream> Reconciler<'_, U> {
    /// Refreshes the mutable metadata of a matched entry, whether or not a new
    /// version is found afterwards.
    pub(super) async fn refresh_entry(&self, entry: &mut CatalogEntry, app: &TrackedApp) {
        entry.repo_slug = Some(app.repo.clone());
        entry.name.clone_from(&app.name);

        let new_id = disambiguate(&entry.bundle_identifier, &app.name, &app.repo);
        if new_id != entry.bundle_identifier {
            info!("Updated Bundle ID for {}: {} -> {}", app.name, entry.bundle_identifier, new_id);
            entry.bundle_identifier = new_id;
        }

        let icon = self.refreshed_icon(entry, app).await;
        entry.icon_url = icon;

        if let Some(tint) = app.tint_override() {
            tint.clone_into(&mut entry.tint_color);
        } else if entry.tint_color.is_empty() || entry.tint_color == self.options.default_tint {
            if let Some(extracted) = dominant_color(self.upstream, &entry.icon_url).await {
                entry.tint_color = extracted;
            }
        }

        entry.drop_legacy_keys();
    }

    /// The icon the entry should carry.
    ///
    /// Starts from the configured override, else the current icon. The best
    /// discovered icon replaces it if it is square while the starting one is
    /// not, or if its path scores higher.
    async fn refreshed_icon(&self, entry: &CatalogEntry, app: &TrackedApp) -> String {
        let current = app.icon_override().unwrap_or(entry.icon_url.as_str()).to_string();

        let candidates = discover_icons(self.upstream, &app.repo).await;
        let Some(discovered) = choose_icon(self.upstream, &candidates).await else {
            return current;
        };

        if current.is_empty() {
            return discovered.url;
        }
        if discovered.url == current {
            return current;
        }

        let current_score = score_path(&current);
        if is_square(self.upstream, &discovered.url).await && !is_square(self.upstream, &current).await {
            info!("Replacing non-square icon with square version from repo: {}", discovered.url);
            discovered.url
        } else if discovered.score > current_score {
            info!(
                "Replacing icon with better version from repo: {} (Score {} > {current_score})",
                discovered.url, discovered.score
            );
            discovered.url
        } else {
            debug!("Keeping icon {current}");
            current
        }
    }

    /// Icon of a new entry: the override, else the best discovered icon.
    ///
    /// The second element is set when the icon was discovered.
    pub(super) async fn initial_icon(&self, app: &TrackedApp) -> (String, Option<String>) {
        if let Some(icon) = app.icon_override() {
            return (icon.to_string(), None);
        }
        let candidates = discover_icons(self.upstream, &app.repo).await;
        match choose_icon(self.upstream, &candidates).await {
            Some(icon) => {
                info!("Selected icon for {}: {}", app.name, icon.url);
                (icon.url.clone(), Some(icon.url))
            }
            None => (String::new(), None),
        }
    }

    /// Tint of a new entry: the override, else the icon's dominant colour,
    /// else the default.
    pub(super) async fn initial_tint(&self, app: &TrackedApp, icon_url: &str) -> String {
        if let Some(tint) = app.tint_override() {
            return tint.to_string();
        }
        dominant_color(self.upstream, icon_url)
            .await
            .unwrap_or_else(|| self.options.default_tint.clone())
    }
}
