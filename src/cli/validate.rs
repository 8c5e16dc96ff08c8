//! The `validate` command: loads curated lists and reports boundary problems.
//!
//! ```bash
//! altsync validate                       # every configured curated list
//! altsync validate sources/apps.json     # specific files
//! altsync validate --strict              # issues fail the command (CI)
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::config::SyncConfig;
use crate::core::SyncError;
use crate::curated::{CuratedList, validate_apps};

#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Curated lists to check (default: those of the configured catalogs)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Fail when any issue is found
    #[arg(long)]
    strict: bool,
}

impl ValidateCommand {
    pub fn execute(self, config: &SyncConfig) -> Result<()> {
        let files = if self.files.is_empty() {
            config.catalogs.iter().map(|t| t.curated_list.clone()).collect()
        } else {
            self.files
        };
        if files.is_empty() {
            return Err(SyncError::NoCatalogs.into());
        }

        let mut total = 0;
        for file in &files {
            let list = CuratedList::load(file)?;
            let issues = validate_apps(&list.apps);
            if issues.is_empty() {
                println!("{} {} ({} apps)", "✓".green(), file.display(), list.apps.len());
            } else {
                println!("{} {} ({} apps)", "⚠".yellow(), file.display(), list.apps.len());
                for issue in &issues {
                    let marker = if issue.skips_entry() {
                        "skipped".red()
                    } else {
                        "ignored".yellow()
                    };
                    println!("    [{marker}] {issue}");
                }
            }
            total += issues.len();
        }

        if self.strict && total > 0 {
            return Err(SyncError::Other {
                message: format!("{total} validation issue(s) found"),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(temp: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = temp.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_strict_fails_on_issues() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "apps.json", r#"[{"name": "Evil", "github_repo": "a/../b"}]"#);

        let lenient = ValidateCommand {
            files: vec![path.clone()],
            strict: false,
        };
        assert!(lenient.execute(&SyncConfig::default()).is_ok());

        let strict = ValidateCommand {
            files: vec![path],
            strict: true,
        };
        assert!(strict.execute(&SyncConfig::default()).is_err());
    }

    #[test]
    fn test_clean_list_passes_strict() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "apps.json", r#"[{"name": "Foo", "github_repo": "org/foo"}]"#);
        let cmd = ValidateCommand {
            files: vec![path],
            strict: true,
        };
        assert!(cmd.execute(&SyncConfig::default()).is_ok());
    }

    #[test]
    fn test_malformed_list_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "apps.json", "[{");
        let cmd = ValidateCommand {
            files: vec![path],
            strict: false,
        };
        let err = cmd.execute(&SyncConfig::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<SyncError>(), Some(SyncError::CuratedListParse { .. })));
    }

    #[test]
    fn test_nothing_to_validate() {
        let cmd = ValidateCommand {
            files: Vec::new(),
            strict: false,
        };
        assert!(cmd.execute(&SyncConfig::default()).is_err());
    }
}
