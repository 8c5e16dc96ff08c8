//! Exit codes and error output of the `altsync` binary.
//!
//! Every case here fails (or succeeds) before any request is sent.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn altsync(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("altsync").unwrap();
    cmd.current_dir(dir).env_remove("GITHUB_TOKEN").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    altsync(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_malformed_curated_list_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("apps.json"), "[{\"name\": ").unwrap();

    altsync(temp.path())
        .args(["sync", "--apps", "apps.json", "--output", "source.json"])
        .args(["--name", "Test", "--identifier", "io.test"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid curated list"));

    assert!(!temp.path().join("source.json").exists());
}

#[test]
fn test_missing_curated_list_is_reported() {
    let temp = TempDir::new().unwrap();
    altsync(temp.path())
        .args(["sync", "--apps", "apps.json", "--output", "source.json"])
        .args(["--name", "Test", "--identifier", "io.test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Curated list not found"));
}

#[test]
fn test_nothing_configured() {
    let temp = TempDir::new().unwrap();
    altsync(temp.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No catalogs to synchronize"));
}

#[test]
fn test_invalid_config_file() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("altsync.toml"), "[sync]\nunknown_option = true\n").unwrap();

    altsync(temp.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration file"));
}

#[test]
fn test_unknown_catalog_name() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("altsync.toml"),
        r#"
[[catalogs]]
name = "Standard"
identifier = "io.example.standard"
curated_list = "apps.json"
catalog = "source.json"
"#,
    )
    .unwrap();

    altsync(temp.path())
        .args(["sync", "--catalog", "Nightly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown catalog 'Nightly'"));
}

#[test]
fn test_validate_strict() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("good.json"),
        r#"[{"name": "Foo", "github_repo": "org/foo", "icon_url": "_No response_"}]"#,
    )
    .unwrap();
    std::fs::write(
        temp.path().join("bad.json"),
        r#"[{"name": "Foo", "github_repo": "org/foo", "tint_color": "red"}]"#,
    )
    .unwrap();

    altsync(temp.path())
        .args(["validate", "--strict", "good.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("good.json (1 apps)"));

    altsync(temp.path())
        .args(["validate", "--strict", "bad.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid tint_color 'red'"));
}
