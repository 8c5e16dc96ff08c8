//! The `sync` command.
//!
//! Targets come from two places: the `[[catalogs]]` of `altsync.toml` and an
//! optional ad-hoc catalog given with `--apps`/`--output`/`--name`/`--identifier`.
//! With an ad-hoc catalog, configured catalogs only run when named with
//! `--catalog`; without one, `--catalog` restricts the configured set and its
//! absence selects all of them.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{CatalogTarget, SyncConfig};
use crate::core::SyncError;
use crate::sync::Reconciler;
use crate::upstream::GitHubClient;

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Curated list of an ad-hoc catalog
    #[arg(long, value_name = "FILE", requires_all = ["output", "name", "identifier"])]
    apps: Option<PathBuf>,

    /// Catalog file written for `--apps`
    #[arg(long, value_name = "FILE", requires = "apps")]
    output: Option<PathBuf>,

    /// Display name of the ad-hoc catalog
    #[arg(long, requires = "apps")]
    name: Option<String>,

    /// Reverse-DNS identifier of the ad-hoc catalog
    #[arg(long, requires = "apps")]
    identifier: Option<String>,

    /// Only synchronize the named configured catalog (repeatable)
    #[arg(long = "catalog", value_name = "NAME")]
    catalogs: Vec<String>,

    /// GitHub token used to raise the API rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Store discovered icons of new apps back into the curated list
    #[arg(long)]
    write_back_icons: bool,
}

impl SyncCommand {
    pub async fn execute(self, mut config: SyncConfig) -> Result<()> {
        let targets = self.targets(&config)?;
        if targets.is_empty() {
            return Err(SyncError::NoCatalogs.into());
        }

        if self.write_back_icons {
            config.sync.write_back_icons = true;
        }
        let token = self.token.filter(|t| !t.trim().is_empty());
        if token.is_none() {
            warn!("No GitHub token set, API requests are rate limited");
        }

        let client = GitHubClient::new(config.github, config.retry, token)?;
        let reconciler = Reconciler::new(&client, config.sync);
        let reports = reconciler.sync_all(&targets).await?;

        let failed: usize = reports.iter().map(|(_, r)| r.failed).sum();
        if failed > 0 {
            warn!("{failed} app(s) failed; their entries were left unchanged");
        }
        let changed = reports.iter().filter(|(_, r)| r.has_changes()).count();
        info!("Synchronized {} catalog(s), {changed} changed", reports.len());
        Ok(())
    }

    /// The catalogs this invocation runs, in order: configured first, then ad-hoc.
    fn targets(&self, config: &SyncConfig) -> Result<Vec<CatalogTarget>> {
        let adhoc = self.adhoc_target();

        let mut targets = if adhoc.is_some() && self.catalogs.is_empty() {
            Vec::new()
        } else {
            config.select(&self.catalogs)?
        };
        targets.extend(adhoc);
        Ok(targets)
    }

    fn adhoc_target(&self) -> Option<CatalogTarget> {
        Some(CatalogTarget {
            name: self.name.clone()?,
            identifier: self.identifier.clone()?,
            curated_list: self.apps.clone()?,
            catalog: self.output.clone()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        cmd: SyncCommand,
    }

    fn parse(args: &[&str]) -> SyncCommand {
        Harness::parse_from(std::iter::once("sync").chain(args.iter().copied())).cmd
    }

    fn config() -> SyncConfig {
        let mut config = SyncConfig::default();
        for name in ["Standard", "Nightly"] {
            config.catalogs.push(CatalogTarget {
                name: name.to_string(),
                identifier: format!("io.example.{}", name.to_lowercase()),
                curated_list: PathBuf::from(format!("{name}/apps.json")),
                catalog: PathBuf::from(format!("{name}/source.json")),
            });
        }
        config
    }

    fn names(targets: &[CatalogTarget]) -> Vec<&str> {
        targets.iter().map(|t| t.name.as_str()).collect()
    }

    const ADHOC: [&str; 8] =
        ["--apps", "apps.json", "--output", "source.json", "--name", "Mine", "--identifier", "io.mine"];

    #[test]
    fn test_all_configured_by_default() {
        let targets = parse(&[]).targets(&config()).unwrap();
        assert_eq!(names(&targets), vec!["Standard", "Nightly"]);
    }

    #[test]
    fn test_catalog_selection() {
        let targets = parse(&["--catalog", "Nightly"]).targets(&config()).unwrap();
        assert_eq!(names(&targets), vec!["Nightly"]);
        assert!(parse(&["--catalog", "Missing"]).targets(&config()).is_err());
    }

    #[test]
    fn test_adhoc_replaces_configured() {
        let targets = parse(&ADHOC).targets(&config()).unwrap();
        assert_eq!(names(&targets), vec!["Mine"]);
        assert_eq!(targets[0].curated_list, PathBuf::from("apps.json"));
        assert_eq!(targets[0].catalog, PathBuf::from("source.json"));

        let mut args = ADHOC.to_vec();
        args.extend(["--catalog", "Standard"]);
        let targets = parse(&args).targets(&config()).unwrap();
        assert_eq!(names(&targets), vec!["Standard", "Mine"]);
    }

    #[test]
    fn test_adhoc_requires_all_fields() {
        assert!(Harness::try_parse_from(["sync", "--apps", "apps.json"]).is_err());
        assert!(Harness::try_parse_from(["sync", "--output", "source.json"]).is_err());
    }

    #[test]
    fn test_no_targets() {
        let targets = parse(&[]).targets(&SyncConfig::default()).unwrap();
        assert!(targets.is_empty());
    }
}
