//! Reconciliation of whole catalogs through the public API.

use altsync::catalog::Catalog;
use altsync::config::CatalogTarget;
use altsync::sync::{Reconciler, SyncOptions};
use altsync::test_utils::FakeUpstream;
use altsync::test_utils::fixtures::{asset, build_ipa, release};
use std::path::Path;
use tempfile::TempDir;

fn target(dir: &Path, name: &str, apps: &serde_json::Value) -> CatalogTarget {
    let slug = name.to_lowercase();
    let target = CatalogTarget {
        name: name.to_string(),
        identifier: format!("io.example.{slug}"),
        curated_list: dir.join(format!("{slug}-apps.json")),
        catalog: dir.join(format!("{slug}-source.json")),
    };
    std::fs::write(&target.curated_list, serde_json::to_string_pretty(apps).unwrap()).unwrap();
    target
}

fn load(target: &CatalogTarget) -> Catalog {
    Catalog::from_json(&std::fs::read_to_string(&target.catalog).unwrap()).unwrap()
}

/// Two flavors of one repository (stable and nightly) plus a repository whose
/// releases are filtered by tag.
fn upstream() -> FakeUpstream {
    let emu_stable = asset("Emu.ipa", 1_000);
    let emu_nightly = asset("Emu-nightly.ipa", 1_100);
    let tools_cli = asset("Tools-cli.ipa", 300);
    let tools_app = asset("Tools.ipa", 200);

    FakeUpstream::new()
        .with_releases(
            "org/emu",
            vec![
                release("v1.0", false, "2024-06-01", vec![emu_stable.clone()]),
                release("v2.0-nightly", true, "2024-06-10", vec![emu_nightly.clone()]),
            ],
        )
        .with_file(&emu_stable.download_url, build_ipa("Emu", "1.0", "100", "com.org.emu"))
        .with_file(&emu_nightly.download_url, build_ipa("Emu", "2.0", "200", "com.org.emu"))
        .with_repo_info("org/emu", Some("An emulator"), "develop")
        .with_releases(
            "org/tools",
            vec![
                release("cli-v3", false, "2024-05-01", vec![tools_cli.clone()]),
                release("app-v2", false, "2024-04-01", vec![tools_app.clone()]),
            ],
        )
        .with_file(&tools_cli.download_url, build_ipa("Tools CLI", "3", "3", "com.org.tools.cli"))
        .with_file(&tools_app.download_url, build_ipa("Tools", "2.0", "20", "com.org.tools"))
}

fn curated() -> serde_json::Value {
    serde_json::json!([
        {"name": "Emu", "github_repo": "org/emu", "category": "Emulators"},
        {"name": "Emu Nightly", "github_repo": "org/emu", "pre_release": true},
        {"name": "Tools", "github_repo": "org/tools", "tag_regex": "^app-"}
    ])
}

#[tokio::test]
async fn test_catalog_built_from_curated_list() {
    altsync::test_utils::init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let target = target(temp.path(), "Standard", &curated());
    let upstream = upstream();

    let report = Reconciler::new(&upstream, SyncOptions::default()).sync_catalog(&target).await.unwrap();
    assert_eq!(report.added, 3);
    assert_eq!(report.failed, 0);

    let catalog = load(&target);
    let names: Vec<&str> = catalog.apps.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Emu", "Emu Nightly", "Tools"]);

    let stable = &catalog.apps[0];
    assert_eq!(stable.current_version, "1.0");
    assert_eq!(stable.bundle_identifier, "com.org.emu");
    assert_eq!(stable.description, "An emulator");
    assert_eq!(stable.icon_url, "https://avatars.example.com/org.png", "owner avatar as last resort");

    let nightly = &catalog.apps[1];
    assert_eq!(nightly.current_version, "2.0");
    assert_eq!(nightly.bundle_identifier, "com.org.emu.nightly");
    assert_eq!(nightly.version_history[0].build_version.as_deref(), Some("200"));
    assert_eq!(nightly.version_history[0].date, "2024-06-10");

    let tools = &catalog.apps[2];
    assert_eq!(tools.current_version, "2.0", "tag filter selects the app release");
    assert_eq!(tools.current_download_url, "https://github.com/downloads/Tools.ipa");
}

#[tokio::test]
async fn test_persisted_document_shape() {
    let temp = TempDir::new().unwrap();
    let target = target(temp.path(), "Standard", &curated());
    std::fs::write(
        &target.catalog,
        r#"{"name": "Old", "identifier": "io.old", "apps": [], "news": [{"title": "Hello"}], "featuredApps": ["com.org.emu"]}"#,
    )
    .unwrap();

    Reconciler::new(&upstream(), SyncOptions::default()).sync_catalog(&target).await.unwrap();

    let raw = std::fs::read_to_string(&target.catalog).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["name"], "Standard");
    assert_eq!(json["identifier"], "io.example.standard");
    assert_eq!(json["news"][0]["title"], "Hello");
    assert_eq!(json["featuredApps"][0], "com.org.emu");

    let app = &json["apps"][0];
    for key in [
        "name",
        "githubRepo",
        "bundleIdentifier",
        "developerName",
        "version",
        "versionDate",
        "versionDescription",
        "downloadURL",
        "localizedDescription",
        "iconURL",
        "tintColor",
        "size",
        "sha256",
        "screenshotURLs",
        "versions",
    ] {
        assert!(app.get(key).is_some(), "missing key {key}");
    }
    assert!(app.get("permissions").is_none());
    assert_eq!(app["versions"][0]["buildVersion"], "100");
    assert!(raw.ends_with("}\n"));
    assert!(raw.contains("\n  \"name\": \"Standard\""), "two-space indentation");
}

#[tokio::test]
async fn test_catalogs_are_independent() {
    let temp = TempDir::new().unwrap();
    let standard = target(
        temp.path(),
        "Standard",
        &serde_json::json!([{"name": "Emu", "github_repo": "org/emu"}]),
    );
    let nightly = target(
        temp.path(),
        "Nightly",
        &serde_json::json!([{"name": "Emu Nightly", "github_repo": "org/emu", "pre_release": true}]),
    );
    let upstream = upstream();

    let reports = Reconciler::new(&upstream, SyncOptions::default())
        .sync_all(&[standard.clone(), nightly.clone()])
        .await
        .unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].0, "Standard");
    assert_eq!(reports[1].1.added, 1);

    assert_eq!(load(&standard).apps[0].current_version, "1.0");
    assert_eq!(load(&nightly).apps[0].current_version, "2.0");
    assert_eq!(load(&nightly).identifier, "io.example.nightly");
}

#[tokio::test]
async fn test_missing_curated_list_stops_the_run() {
    let temp = TempDir::new().unwrap();
    let good = target(temp.path(), "Standard", &curated());
    let mut missing = target(temp.path(), "Missing", &serde_json::json!([]));
    missing.curated_list = temp.path().join("nowhere.json");

    let result = Reconciler::new(&upstream(), SyncOptions::default()).sync_all(&[missing, good.clone()]).await;
    assert!(result.is_err());
    assert!(!good.catalog.exists(), "later catalogs are not processed");
}

#[tokio::test]
async fn test_rerun_is_stable() {
    let temp = TempDir::new().unwrap();
    let target = target(temp.path(), "Standard", &curated());
    let upstream = upstream();
    let reconciler = Reconciler::new(&upstream, SyncOptions::default());

    reconciler.sync_catalog(&target).await.unwrap();
    let first = std::fs::read(&target.catalog).unwrap();

    let report = reconciler.sync_catalog(&target).await.unwrap();
    assert_eq!(report.up_to_date, 3);
    assert_eq!(std::fs::read(&target.catalog).unwrap(), first);
    assert_eq!(upstream.downloads().len(), 3);
}
