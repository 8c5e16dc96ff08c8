use super::*;
use crate::curated::TrackedApp;
use tempfile::TempDir;

fn record(version: &str, url: &str) -> VersionRecord {
    VersionRecord {
        version: version.to_string(),
        build_version: Some("42".to_string()),
        date: "2024-06-01".to_string(),
        notes: format!("Release {version}"),
        download_url: url.to_string(),
        size_bytes: 100,
        sha256: format!("hash-{version}"),
        extra: serde_json::Map::new(),
    }
}

fn entry(name: &str, repo: Option<&str>) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        repo_slug: repo.map(str::to_string),
        bundle_identifier: format!("com.example.{}", name.to_lowercase()),
        developer_name: repo.map_or("legacy", |r| r.split('/').next().unwrap()).to_string(),
        current_version: String::new(),
        current_version_date: String::new(),
        current_version_notes: String::new(),
        current_download_url: String::new(),
        description: "An app".to_string(),
        icon_url: "https://example.com/icon.png".to_string(),
        tint_color: "#112233".to_string(),
        size_bytes: 0,
        sha256: None,
        screenshot_urls: Vec::new(),
        version_history: Vec::new(),
        extra: serde_json::Map::new(),
    }
}

#[test]
fn test_push_version_is_newest_first_and_mirrors() {
    let mut e = entry("Foo", Some("org/foo"));
    assert!(e.push_version(record("1.0.0", "https://dl/1")));
    assert!(e.push_version(record("1.1.0", "https://dl/2")));

    assert_eq!(e.version_history.len(), 2);
    assert_eq!(e.version_history[0].version, "1.1.0");
    assert_eq!(e.current_version, "1.1.0");
    assert_eq!(e.current_download_url, "https://dl/2");
    assert_eq!(e.sha256.as_deref(), Some("hash-1.1.0"));
}

#[test]
fn test_push_version_suppresses_duplicate_url() {
    let mut e = entry("Foo", Some("org/foo"));
    assert!(e.push_version(record("1.0.0", "https://dl/1")));
    assert!(!e.push_version(record("1.0.0-again", "https://dl/1")));
    assert_eq!(e.version_history.len(), 1);
    assert_eq!(e.current_version, "1.0.0");
}

#[test]
fn test_find_match_exact_and_legacy() {
    let mut catalog = Catalog::new("Test", "io.test");
    catalog.apps.push(entry("UTM", Some("utmapp/UTM")));
    catalog.apps.push(entry("Delta", Some("rileytestut/Delta")));

    assert_eq!(catalog.find_match("utmapp/UTM", "UTM"), Some(0));
    // Single entry for the repo: adopted by a renamed flavor.
    assert_eq!(catalog.find_match("rileytestut/Delta", "Delta (Beta)"), Some(1));
    assert_eq!(catalog.find_match("org/unknown", "UTM"), None);

    catalog.apps.push(entry("UTM SE", Some("utmapp/UTM")));
    // Two entries share the repo: no guessing.
    assert_eq!(catalog.find_match("utmapp/UTM", "UTM HV"), None);
    assert_eq!(catalog.find_match("utmapp/UTM", "UTM SE"), Some(2));
}

#[test]
fn test_save_and_load_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("source.json");

    let mut catalog = Catalog::new("Test Source", "io.test.source");
    let mut e = entry("Foo", Some("org/foo"));
    e.push_version(record("1.0.0", "https://dl/1"));
    e.push_version(record("2.0.0", "https://dl/2"));
    e.extra.insert("subtitle".to_string(), serde_json::json!("kept"));
    catalog.apps.push(e);
    catalog.apps.push(entry("Legacy", None));

    catalog.save(&path).unwrap();
    let loaded = Catalog::load(&path, "Test Source", "io.test.source");

    assert_eq!(loaded, catalog);
    assert_eq!(loaded.apps[0].version_history[0].version, "2.0.0");
    assert_eq!(loaded.apps[0].version_history[1].version, "1.0.0");

    // Saving the loaded catalog again is byte-identical.
    let first = std::fs::read_to_string(&path).unwrap();
    loaded.save(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn test_persisted_key_names() {
    let mut catalog = Catalog::new("Test", "io.test");
    let mut e = entry("Foo", Some("org/foo"));
    e.push_version(record("1.0.0", "https://dl/1"));
    catalog.apps.push(e);

    let json = catalog.to_json().unwrap();
    for key in [
        "\"githubRepo\"",
        "\"bundleIdentifier\"",
        "\"developerName\"",
        "\"versionDate\"",
        "\"versionDescription\"",
        "\"downloadURL\"",
        "\"localizedDescription\"",
        "\"iconURL\"",
        "\"tintColor\"",
        "\"screenshotURLs\"",
        "\"buildVersion\"",
        "\"versions\"",
        "\"news\"",
    ] {
        assert!(json.contains(key), "missing {key} in {json}");
    }
}

#[test]
fn test_load_heals_corrupted_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("source.json");

    std::fs::write(&path, "{ this is not json").unwrap();
    let catalog = Catalog::load(&path, "Fresh", "io.fresh");
    assert_eq!(catalog, Catalog::new("Fresh", "io.fresh"));

    std::fs::write(&path, "   \n").unwrap();
    assert!(Catalog::load(&path, "Fresh", "io.fresh").apps.is_empty());

    let missing = temp.path().join("missing.json");
    assert!(Catalog::load(&missing, "Fresh", "io.fresh").apps.is_empty());
}

#[test]
fn test_load_overrides_name_and_identifier() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("source.json");
    Catalog::new("Old", "io.old").save(&path).unwrap();

    let catalog = Catalog::load(&path, "New", "io.new");
    assert_eq!(catalog.name, "New");
    assert_eq!(catalog.identifier, "io.new");
}

#[test]
fn test_drop_legacy_keys() {
    let mut e = entry("Foo", Some("org/foo"));
    e.extra.insert(LEGACY_PERMISSIONS_KEY.to_string(), serde_json::json!({}));
    e.extra.insert("subtitle".to_string(), serde_json::json!("kept"));
    e.drop_legacy_keys();
    assert!(!e.extra.contains_key(LEGACY_PERMISSIONS_KEY));
    assert!(e.extra.contains_key("subtitle"));
}

#[test]
fn test_prune_removes_untracked_repos() {
    let mut catalog = Catalog::new("Test", "io.test");
    catalog.apps.push(entry("Foo", Some("org/foo")));
    catalog.apps.push(entry("Bar", Some("org/bar")));
    catalog.apps.push(entry("Old", None));

    let apps = vec![TrackedApp::new("Foo", "org/foo")];
    let removed = catalog.prune(&apps);

    assert_eq!(removed, 2);
    assert_eq!(catalog.apps.len(), 1);
    assert_eq!(catalog.apps[0].name, "Foo");
}

#[test]
fn test_prune_keeps_legacy_entry_by_developer_and_name() {
    let mut catalog = Catalog::new("Test", "io.test");
    let mut legacy = entry("Delta", None);
    legacy.developer_name = "rileytestut".to_string();
    catalog.apps.push(legacy);

    let apps = vec![TrackedApp::new("Delta", "rileytestut/Delta")];
    assert_eq!(catalog.prune(&apps), 0);

    let apps = vec![TrackedApp::new("Delta Beta", "rileytestut/Delta")];
    assert_eq!(catalog.prune(&apps), 1);
}

#[test]
fn test_sort_follows_curated_order() {
    let mut catalog = Catalog::new("Test", "io.test");
    catalog.apps.push(entry("Legacy", None));
    catalog.apps.push(entry("Bar", Some("org/bar")));
    catalog.apps.push(entry("UTM SE", Some("utmapp/UTM")));
    catalog.apps.push(entry("Foo", Some("org/foo")));
    catalog.apps.push(entry("UTM", Some("utmapp/UTM")));

    let apps = vec![
        TrackedApp::new("Foo", "org/foo"),
        TrackedApp::new("UTM", "utmapp/UTM"),
        TrackedApp::new("UTM SE", "utmapp/UTM"),
        TrackedApp::new("Bar", "org/bar"),
    ];
    catalog.sort_by_curated(&apps);

    let names: Vec<&str> = catalog.apps.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Foo", "UTM", "UTM SE", "Bar", "Legacy"]);
}

#[test]
fn test_load_treats_null_as_absent() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("source.json");
    std::fs::write(
        &path,
        r#"{
  "name": "Old",
  "identifier": "io.old",
  "news": null,
  "apps": [
    {
      "name": "Foo",
      "githubRepo": "org/foo",
      "tintColor": null,
      "localizedDescription": null,
      "size": null,
      "sha256": null,
      "versions": [
        {"version": "1.0.0", "date": "2024-01-01", "size": 10, "sha256": "aa"},
        {"version": "0.9.0", "downloadURL": "https://dl/0.9", "localizedDescription": null}
      ]
    }
  ]
}"#,
    )
    .unwrap();

    let catalog = Catalog::load(&path, "Test", "io.test");
    assert_eq!(catalog.apps.len(), 1);
    assert!(catalog.news.is_empty());

    let foo = &catalog.apps[0];
    assert_eq!(foo.tint_color, "");
    assert_eq!(foo.description, "");
    assert_eq!(foo.size_bytes, 0);
    assert_eq!(foo.sha256, None);
    assert_eq!(foo.version_history.len(), 2);
    assert_eq!(foo.version_history[0].download_url, "");
    assert_eq!(foo.version_history[1].download_url, "https://dl/0.9");
    assert_eq!(foo.version_history[1].notes, "");
}

#[test]
fn test_load_drops_only_the_malformed_entry() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("source.json");
    std::fs::write(
        &path,
        r#"{"apps": [
  {"name": "Foo", "githubRepo": "org/foo", "size": "large"},
  {"name": "Bar", "githubRepo": "org/bar", "versions": [{"version": "2.0", "downloadURL": "https://dl/bar"}]},
  "not an entry"
]}"#,
    )
    .unwrap();

    let catalog = Catalog::load(&path, "Test", "io.test");
    let names: Vec<&str> = catalog.apps.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Bar"]);
    assert_eq!(catalog.apps[0].version_history[0].download_url, "https://dl/bar");
}
