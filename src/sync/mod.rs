//! Catalog reconciliation.
//!
//! [`Reconciler::sync_catalog`] brings one catalog in line with its curated
//! list:
//!
//! 1. load the curated list (fatal if missing or malformed) and validate it
//! 2. load the catalog (self-healing: unreadable means empty)
//! 3. for every tracked app, in list order: match an existing entry, refresh its
//!    metadata, resolve release and asset, download new builds and record them
//! 4. prune entries that are no longer tracked and order the rest like the list
//! 5. write the catalog atomically, once
//!
//! Failures while processing a single app are logged and counted; they never
//! abort the run. Only curated-list and write failures are fatal.

mod metadata;


use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{Instrument, error, info, info_span, warn};

use crate::catalog::{Catalog, CatalogEntry, VersionRecord};
use crate::config::CatalogTarget;
use crate::constants::{DEFAULT_DESCRIPTION, DEFAULT_TINT, DEFAULT_VERSION_NOTES};
use crate::curated::{CuratedList, TrackedApp, ValidationIssue, validate_apps};
use crate::identifier::disambiguate;
use crate::names::repo_owner;
use crate::package::fetch_package;
use crate::resolver::{resolve_asset, resolve_release};
use crate::upstream::{Fetch, Upstream, UpstreamRelease};

/// Behaviour switches (`[sync]` in `altsync.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncOptions {
    /// Tint used when none is configured and none can be extracted. An entry
    /// carrying this tint has its tint re-derived on every run.
    pub default_tint: String,

    /// Store discovered icons of new entries back into the curated list.
    pub write_back_icons: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            default_tint: DEFAULT_TINT.to_string(),
            write_back_icons: false,
        }
    }
}

/// What happened to one tracked app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppOutcome {
    /// A new catalog entry was created. Carries the icon URL when it was
    /// discovered rather than configured.
    Added {
        discovered_icon: Option<String>,
    },
    /// A new version was recorded for an existing entry.
    Updated,
    /// The resolved asset is already recorded.
    UpToDate,
    /// Nothing to publish (no release, no asset, invalid entry).
    Skipped(String),
    /// Download or package inspection failed; the entry is untouched.
    Failed(String),
}

/// Counts for one catalog run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: usize,
    pub updated: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pruned: usize,
    pub curated_list_rewritten: bool,
}

impl SyncReport {
    fn record(&mut self, outcome: &AppOutcome) {
        match outcome {
            AppOutcome::Added {
                ..
            } => self.added += 1,
            AppOutcome::Updated => self.updated += 1,
            AppOutcome::UpToDate => self.up_to_date += 1,
            AppOutcome::Skipped(_) => self.skipped += 1,
            AppOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Whether the catalog content changed beyond metadata refreshes.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.added > 0 || self.updated > 0 || self.pruned > 0
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} updated, {} up to date, {} skipped, {} failed, {} pruned",
            self.added, self.updated, self.up_to_date, self.skipped, self.failed, self.pruned
        )
    }
}

/// Drives synchronization against an [`Upstream`].
#[derive(Debug)]
pub struct Reconciler<'a, U> {
    upstream: &'a U,
    options: SyncOptions,
}

impl<'a, U: Upstream> Reconciler<'a, U> {
    pub const fn new(upstream: &'a U, options: SyncOptions) -> Self {
        Self {
            upstream,
            options,
        }
    }

    /// Synchronizes every target in order. The first fatal error stops the run.
    pub async fn sync_all(&self, targets: &[CatalogTarget]) -> Result<Vec<(String, SyncReport)>> {
        let mut reports = Vec::with_capacity(targets.len());
        for target in targets {
            let report = self.sync_catalog(target).await?;
            info!("{}: {report}", target.name);
            reports.push((target.name.clone(), report));
        }
        Ok(reports)
    }

    /// Synchronizes one catalog with its curated list and writes it.
    ///
    /// # Errors
    ///
    /// Fatal only: the curated list is missing or malformed, or the catalog
    /// (or the rewritten curated list) cannot be written.
    pub async fn sync_catalog(&self, target: &CatalogTarget) -> Result<SyncReport> {
        info!("Synchronizing {} from {}", target.name, target.curated_list.display());

        let mut curated = CuratedList::load(&target.curated_list)?;
        let issues = validate_apps(&curated.apps);
        for issue in &issues {
            warn!("{}: {issue}", target.curated_list.display());
        }

        let mut catalog = Catalog::load(&target.catalog, &target.name, &target.identifier);
        let mut report = SyncReport::default();
        let mut curated_changed = false;

        for index in 0..curated.apps.len() {
            let app_issues: Vec<&ValidationIssue> = issues.iter().filter(|i| i.index() == index).collect();
            let outcome = if app_issues.iter().any(|i| i.skips_entry()) {
                AppOutcome::Skipped("invalid curated entry".to_string())
            } else {
                let app = effective_app(&curated.apps[index], &app_issues);
                let span = info_span!("app", name = %app.name, repo = %app.repo);
                self.sync_app(&mut catalog, &app, &curated.apps).instrument(span).await
            };

            if let AppOutcome::Added {
                discovered_icon: Some(icon),
            } = &outcome
            {
                if self.options.write_back_icons {
                    let app = &curated.apps[index];
                    let (repo, name) = (app.repo.clone(), app.name.clone());
                    if curated.set_icon_override(&repo, &name, icon) {
                        info!("Syncing found icon back to curated list for {name}");
                        curated_changed = true;
                    }
                }
            }
            report.record(&outcome);
        }

        report.pruned = catalog.prune(&curated.apps);
        catalog.sort_by_curated(&curated.apps);

        catalog.save(&target.catalog)?;
        info!("Saved {}", target.catalog.display());

        if curated_changed {
            curated.save(&target.curated_list)?;
            info!("Updated {} with auto-detected metadata", target.curated_list.display());
            report.curated_list_rewritten = true;
        }

        Ok(report)
    }

    /// Processes one tracked app against the in-memory catalog.
    pub async fn sync_app(&self, catalog: &mut Catalog, app: &TrackedApp, all: &[TrackedApp]) -> AppOutcome {
        info!("Processing {} ({})...", app.name, app.repo);

        let matched = match_entry(catalog, app, all);
        if let Some(index) = matched {
            self.refresh_entry(&mut catalog.apps[index], app).await;
        }

        let release = match self.upstream.releases(&app.repo).await {
            Fetch::Found(releases) => {
                resolve_release(&releases, app.prefer_pre_release, app.tag_filter())
            }
            Fetch::Missing | Fetch::Unavailable(_) => None,
        };
        let Some(release) = release else {
            warn!("No release found for {}", app.name);
            return AppOutcome::Skipped("no release found".to_string());
        };

        let Some(asset) = resolve_asset(&release.assets, &app.name, &app.repo, app.asset_filter()) else {
            warn!("No IPA found for {}", app.name);
            return AppOutcome::Skipped("no package asset".to_string());
        };

        if let Some(index) = matched {
            if catalog.apps[index].has_download(&asset.download_url) {
                info!("Skipping {} (Already up to date)", app.name);
                return AppOutcome::UpToDate;
            }
        }

        info!("Downloading IPA for {}...", app.name);
        let package = match fetch_package(self.upstream, &asset, &app.name, &release.tag).await {
            Ok(package) => package,
            Err(e) => {
                error!("Download or processing failed for {}: {e:#}", app.name);
                return AppOutcome::Failed(format!("{e:#}"));
            }
        };

        let identifier = disambiguate(&package.identifier, &app.name, &app.repo);
        let repo_info = self.upstream.repo_info(&app.repo).await.found().unwrap_or_default();
        let description = repo_info
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        let record = VersionRecord {
            version: package.version,
            build_version: package.build,
            date: release_date(&release),
            notes: release_notes(&release),
            download_url: asset.download_url.clone(),
            size_bytes: asset.size_bytes,
            sha256: package.sha256,
            extra: serde_json::Map::new(),
        };

        match matched {
            Some(index) => {
                let entry = &mut catalog.apps[index];
                info!("New version {} detected for {}", record.version, app.name);
                entry.push_version(record);
                entry.description = description;
                entry.bundle_identifier = identifier;
                AppOutcome::Updated
            }
            None => {
                info!("Adding new app: {}", app.name);
                let (icon_url, discovered_icon) = self.initial_icon(app).await;
                let tint_color = self.initial_tint(app, &icon_url).await;

                let mut entry = CatalogEntry {
                    name: app.name.clone(),
                    repo_slug: Some(app.repo.clone()),
                    bundle_identifier: identifier,
                    developer_name: repo_owner(&app.repo).to_string(),
                    current_version: String::new(),
                    current_version_date: String::new(),
                    current_version_notes: String::new(),
                    current_download_url: String::new(),
                    description,
                    icon_url,
                    tint_color,
                    size_bytes: 0,
                    sha256: None,
                    screenshot_urls: Vec::new(),
                    version_history: Vec::new(),
                    extra: serde_json::Map::new(),
                };
                entry.push_version(record);
                catalog.apps.push(entry);
                AppOutcome::Added {
                    discovered_icon,
                }
            }
        }
    }
}

/// The curated entry with rejected overrides removed.
fn effective_app(app: &TrackedApp, issues: &[&ValidationIssue]) -> TrackedApp {
    let mut app = app.clone();
    for issue in issues {
        match issue {
            ValidationIssue::InvalidIconUrl {
                ..
            } => app.icon_url = None,
            ValidationIssue::InvalidTint {
                ..
            } => app.tint_color = None,
            _ => {}
        }
    }
    app
}

/// Finds the catalog entry `app` should update.
///
/// A non-exact (single entry per repository) match is refused when the
/// entry's own name is tracked by another flavor of the same repository, so
/// adding a flavor never takes over an existing one.
fn match_entry(catalog: &Catalog, app: &TrackedApp, all: &[TrackedApp]) -> Option<usize> {
    let index = catalog.find_match(&app.repo, &app.name)?;
    let entry_name = &catalog.apps[index].name;
    if entry_name != &app.name && all.iter().any(|a| a.is_identified_by(&app.repo, entry_name)) {
        return None;
    }
    Some(index)
}

/// `YYYY-MM-DD` of the release's publication.
fn release_date(release: &UpstreamRelease) -> String {
    let published = release.published();
    chrono::DateTime::parse_from_rfc3339(published).map_or_else(
        |_| published.split('T').next().unwrap_or_default().to_string(),
        |dt| dt.date_naive().format("%Y-%m-%d").to_string(),
    )
}

fn release_notes(release: &UpstreamRelease) -> String {
    release
        .body
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or(DEFAULT_VERSION_NOTES)
        .to_string()
}
