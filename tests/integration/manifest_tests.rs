//! Whole-manifest parsing, discovery and configuration over the fixture project

use manifestkit::model::activity::{launch_mode, screen_orientation};
use manifestkit::model::permission::protection;
use manifestkit::model::MetaValue;
use manifestkit::report::json;
use manifestkit::{Config, FileFinder, ManifestOutcome, ManifestParser};
use std::fs;
use std::path::PathBuf;

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn main_manifest() -> PathBuf {
    fixtures_path().join("project/app/src/main/AndroidManifest.xml")
}

// ============================================================================
// Full manifest
// ============================================================================

#[test]
fn test_full_manifest_package() {
    let parsed = ManifestParser::default().parse_file(&main_manifest()).unwrap();
    let pkg = &parsed.package;

    assert_eq!(pkg.package_name, "com.example.notes");
    assert_eq!(pkg.min_sdk, 24);
    assert_eq!(pkg.target_sdk, 33);
    assert_eq!(pkg.class_name.as_deref(), Some("com.example.notes.NotesApplication"));
    assert_eq!(pkg.meta_data.get("com.example.notes.API_LEVEL"), Some(&MetaValue::Int(3)));
    assert!(parsed.deferred_errors.is_empty());
}

#[test]
fn test_full_manifest_activities() {
    let parsed = ManifestParser::default().parse_file(&main_manifest()).unwrap();
    let pkg = &parsed.package;

    let names: Vec<&str> = pkg.activities.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "com.example.notes.MainActivity",
            "com.example.notes.EditorActivity",
            "com.example.notes.ShortcutAlias",
        ]
    );

    let main = &pkg.activities[0];
    assert!(main.exported);
    assert_eq!(main.launch_mode, launch_mode::SINGLE_TOP);
    assert_eq!(main.screen_orientation, screen_orientation::PORTRAIT);
    assert_eq!(main.intents.len(), 2);
    assert!(main.intents[1].auto_verify);
    assert_eq!(main.intents[1].paths[0].path, "/note/");

    let editor = &pkg.activities[1];
    assert!(!editor.exported);
    assert_eq!(
        editor.parent_activity_name.as_deref(),
        Some("com.example.notes.MainActivity")
    );
    assert!(editor.window_layout.is_some());

    let alias = &pkg.activities[2];
    assert!(alias.is_alias());
    assert_eq!(alias.launch_mode, launch_mode::SINGLE_TOP);
}

#[test]
fn test_full_manifest_other_components() {
    let parsed = ManifestParser::default().parse_file(&main_manifest()).unwrap();
    let pkg = &parsed.package;

    let receiver = &pkg.receivers[0];
    assert_eq!(receiver.name, "com.example.notes.BootReceiver");
    assert!(receiver.direct_boot_aware);
    assert!(!receiver.exported);
    assert_eq!(receiver.intents[0].priority, 100);

    let service = &pkg.services[0];
    assert_eq!(service.name, "com.example.notes.sync.SyncService");
    assert_eq!(service.process_name.as_deref(), Some("com.example.notes:sync"));
    assert_eq!(
        service.permission.as_deref(),
        Some("android.permission.BIND_JOB_SERVICE")
    );
    assert_ne!(service.foreground_service_type, 0);

    let provider = &pkg.providers[0];
    assert_eq!(provider.name, "androidx.core.content.FileProvider");
    assert_eq!(provider.authority, "com.example.notes.files");
    assert!(provider.grant_uri_permissions);
    assert!(!provider.exported);
    assert!(provider.meta_data.contains_key("android.support.FILE_PROVIDER_PATHS"));
    assert_eq!(provider.path_permissions.len(), 1);
}

#[test]
fn test_full_manifest_permissions_and_extras() {
    let parsed = ManifestParser::default().parse_file(&main_manifest()).unwrap();
    let pkg = &parsed.package;

    assert_eq!(pkg.permissions.len(), 2);
    let read_notes = &pkg.permissions[0];
    assert_eq!(read_notes.name, "com.example.notes.permission.READ_NOTES");
    assert_eq!(read_notes.protection(), protection::SIGNATURE);
    assert_eq!(
        read_notes.group.as_deref(),
        Some("com.example.notes.permission-group.NOTES")
    );
    assert!(pkg.permissions[1].tree);

    assert_eq!(pkg.permission_groups[0].priority, 10);
    assert_eq!(pkg.instrumentations[0].name, "androidx.test.runner.AndroidJUnitRunner");
    assert_eq!(
        pkg.instrumentations[0].target_package.as_deref(),
        Some("com.example.notes")
    );
    assert_eq!(pkg.attributions[0].tag, "sync");
}

#[test]
fn test_string_values_from_config() {
    let mut strings = std::collections::BTreeMap::new();
    strings.insert("app_name".to_string(), "Notes".to_string());

    let parsed = ManifestParser::default()
        .with_strings(strings)
        .parse_file(&main_manifest())
        .unwrap();

    assert!(parsed.resources.string_value("app_name").is_some());
}

#[test]
fn test_missing_package_reports_path() {
    let path = fixtures_path().join("invalid/AndroidManifest.xml");
    let report = ManifestParser::default().parse_file(&path).unwrap_err();

    let messages: Vec<String> = report.chain().map(|cause| cause.to_string()).collect();
    assert!(messages[0].contains("invalid"), "{:?}", messages);
    assert!(messages
        .iter()
        .any(|m| m == "<manifest> does not specify package"));
}

#[test]
fn test_unreadable_manifest() {
    let path = fixtures_path().join("does/not/exist/AndroidManifest.xml");
    let report = ManifestParser::default().parse_file(&path).unwrap_err();
    assert!(report.to_string().starts_with("Failed to read manifest"));
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_discovery_skips_build_outputs() {
    let config = Config::default();
    let manifests = FileFinder::new(&config)
        .find_manifests(&fixtures_path().join("project"))
        .unwrap();

    let sets: Vec<Option<&str>> = manifests.iter().map(|m| m.source_set.as_deref()).collect();
    assert_eq!(sets, vec![Some("debug"), Some("main")]);
}

#[test]
fn test_discovery_with_extra_exclude() {
    let mut config = Config::default();
    config.exclude.push("**/debug/**".to_string());

    let manifests = FileFinder::new(&config)
        .find_manifests(&fixtures_path().join("project"))
        .unwrap();
    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0].source_set.as_deref(), Some("main"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_yaml_config_drives_parser() {
    let dir = tempfile::Builder::new().prefix("manifestkit").tempdir().unwrap();
    let config_path = dir.path().join(".manifestkit.yml");
    fs::write(
        &config_path,
        r#"
parse:
  ignore_processes: true
resources:
  strings:
    app_name: Notes
report:
  format: json
"#,
    )
    .unwrap();

    let config = Config::from_default_locations(dir.path()).unwrap();
    assert_eq!(config.report.format, "json");
    assert!(!config.exclude.is_empty());

    let parsed = ManifestParser::new(config.parse.to_options())
        .with_strings(config.resources.strings.clone())
        .parse_file(&main_manifest())
        .unwrap();
    assert_eq!(
        parsed.package.services[0].process_name.as_deref(),
        Some("com.example.notes")
    );
}

#[test]
fn test_json_report_for_fixture_project() {
    let config = Config::default();
    let parser = ManifestParser::default();
    let outcomes: Vec<ManifestOutcome> = FileFinder::new(&config)
        .find_manifests(&fixtures_path().join("project"))
        .unwrap()
        .into_iter()
        .map(|file| ManifestOutcome {
            result: parser.parse_file(&file.path).map_err(|e| e.to_string()),
            path: file.path,
            source_set: file.source_set,
        })
        .collect();

    let rendered = json::render(&outcomes).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["total_manifests"], 2);
    assert_eq!(value["failed"], 0);
    assert_eq!(
        value["manifests"][1]["manifest"]["package"]["package_name"],
        "com.example.notes"
    );
    assert!(value["manifests"][1]["manifest"]["resources"].is_object());
}
