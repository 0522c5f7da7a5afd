//! Component-level behaviour through the public parser API

use manifestkit::model::activity::{launch_mode, screen_orientation};
use manifestkit::model::permission::protection;
use manifestkit::model::{PatternKind, ResizeMode};
use manifestkit::parser::{ManifestParser, ParseFlags, ParseOptions};
use manifestkit::{ParseError, ParsedManifest};

fn manifest(target_sdk: u32, application: &str) -> String {
    format!(
        r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.app">
            <uses-sdk android:minSdkVersion="21" android:targetSdkVersion="{}"/>
            <application>{}</application>
        </manifest>"#,
        target_sdk, application
    )
}

fn parse(target_sdk: u32, application: &str) -> ParsedManifest {
    ManifestParser::default()
        .parse_str(&manifest(target_sdk, application))
        .unwrap()
}

fn parse_err(target_sdk: u32, application: &str) -> ParseError {
    ManifestParser::default()
        .parse_str(&manifest(target_sdk, application))
        .unwrap_err()
}

// ============================================================================
// Activities
// ============================================================================

#[test]
fn test_launcher_activity_is_exported_by_intent_filter() {
    let parsed = parse(
        33,
        r#"<activity android:name=".Main">
            <intent-filter>
                <action android:name="android.intent.action.MAIN"/>
                <category android:name="android.intent.category.LAUNCHER"/>
            </intent-filter>
        </activity>
        <activity android:name=".Detail"/>"#,
    );

    let activities = &parsed.package.activities;
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0].name, "com.example.app.Main");
    assert!(activities[0].exported);
    assert!(activities[0].intents[0].has_action("android.intent.action.MAIN"));
    assert_eq!(activities[1].name, "com.example.app.Detail");
    assert!(!activities[1].exported);
}

#[test]
fn test_activity_launch_attributes() {
    let parsed = parse(
        33,
        r#"<activity android:name=".Player"
            android:launchMode="singleTask"
            android:screenOrientation="sensorLandscape"
            android:resizeableActivity="false"
            android:taskAffinity=":player"/>"#,
    );

    let player = &parsed.package.activities[0];
    assert_eq!(player.launch_mode, launch_mode::SINGLE_TASK);
    assert_eq!(player.screen_orientation, screen_orientation::SENSOR_LANDSCAPE);
    assert_eq!(player.resize_mode, ResizeMode::Unresizeable);
    assert_eq!(player.task_affinity.as_deref(), Some("com.example.app:player"));
}

#[test]
fn test_activity_alias_copies_target() {
    let parsed = parse(
        33,
        r#"<activity android:name=".Main" android:launchMode="singleTop" android:exported="false"/>
        <activity-alias android:name=".Alias" android:targetActivity=".Main" android:exported="true"/>"#,
    );

    let alias = parsed.package.find_activity("com.example.app.Alias").unwrap();
    assert!(alias.is_alias());
    assert_eq!(alias.target_activity.as_deref(), Some("com.example.app.Main"));
    assert_eq!(alias.launch_mode, launch_mode::SINGLE_TOP);
    assert!(alias.exported);
}

#[test]
fn test_alias_before_target_is_rejected() {
    let err = parse_err(
        33,
        r#"<activity-alias android:name=".Alias" android:targetActivity=".Main"/>
        <activity android:name=".Main"/>"#,
    );
    assert_eq!(
        err.to_string(),
        "<activity-alias> target activity com.example.app.Main not found in manifest"
    );
}

#[test]
fn test_receiver_ignores_activity_only_children() {
    let parsed = parse(
        33,
        r#"<receiver android:name=".Boot" android:exported="true">
            <intent-filter android:priority="5">
                <action android:name="android.intent.action.BOOT_COMPLETED"/>
            </intent-filter>
        </receiver>"#,
    );

    let receiver = &parsed.package.receivers[0];
    assert_eq!(receiver.name, "com.example.app.Boot");
    assert_eq!(receiver.intents[0].priority, 5);
    assert!(parsed.package.activities.is_empty());
}

// ============================================================================
// Intent filters
// ============================================================================

#[test]
fn test_deep_link_filter() {
    let parsed = parse(
        33,
        r#"<activity android:name=".Link" android:exported="true">
            <intent-filter android:autoVerify="true">
                <action android:name="android.intent.action.VIEW"/>
                <category android:name="android.intent.category.DEFAULT"/>
                <category android:name="android.intent.category.BROWSABLE"/>
                <data android:scheme="https" android:host="*.example.com" android:pathPattern="/item/.*"/>
            </intent-filter>
        </activity>"#,
    );

    let filter = &parsed.package.activities[0].intents[0];
    assert!(filter.auto_verify);
    assert!(filter.has_default);
    assert_eq!(filter.data_schemes, vec!["https"]);
    assert!(filter.authorities[0].wild);
    assert!(filter.authorities[0].matches_host("notes.example.com"));
    assert_eq!(filter.paths[0].kind, PatternKind::SimpleGlob);
    assert!(filter.paths[0].matches("/item/42"));
}

#[test]
fn test_empty_action_is_tolerated_for_old_targets() {
    let parsed = parse(
        28,
        r#"<activity android:name=".Old">
            <intent-filter><action android:name=""/></intent-filter>
        </activity>"#,
    );
    assert_eq!(parsed.deferred_errors.len(), 1);

    let err = parse_err(
        30,
        r#"<activity android:name=".New">
            <intent-filter><action android:name=""/></intent-filter>
        </activity>"#,
    );
    assert!(err.is_deferred());
}

#[test]
fn test_tolerant_options_never_escalate() {
    let mut options = ParseOptions::new();
    options.tolerate_deferred_errors = true;

    let parsed = ManifestParser::new(options)
        .parse_str(&manifest(
            33,
            r#"<activity android:name=".New">
                <intent-filter><category android:name=""/></intent-filter>
            </activity>"#,
        ))
        .unwrap();
    assert_eq!(parsed.deferred_errors.len(), 1);
}

// ============================================================================
// Services and processes
// ============================================================================

#[test]
fn test_service_process_names() {
    let source = r#"<service android:name=".Sync" android:process=":sync"/>
        <service android:name=".Remote" android:process="com.other.remote"/>"#;

    let parsed = parse(33, source);
    let services = &parsed.package.services;
    assert_eq!(services[0].process_name.as_deref(), Some("com.example.app:sync"));
    assert_eq!(services[1].process_name.as_deref(), Some("com.other.remote"));

    let options = ParseOptions::new().with_flags(ParseFlags::IGNORE_PROCESSES);
    let parsed = ManifestParser::new(options).parse_str(&manifest(33, source)).unwrap();
    for service in &parsed.package.services {
        assert_eq!(service.process_name.as_deref(), Some("com.example.app"));
    }
}

#[test]
fn test_separate_process_is_folded_into_application() {
    let options = ParseOptions::new().with_separate_processes(vec![":sync".to_string()]);
    let parsed = ManifestParser::new(options)
        .parse_str(&manifest(33, r#"<service android:name=".Sync" android:process=":sync"/>"#))
        .unwrap();

    assert_eq!(
        parsed.package.services[0].process_name.as_deref(),
        Some("com.example.app")
    );
}

#[test]
fn test_bad_process_name() {
    let err = parse_err(33, r#"<service android:name=".Sync" android:process=":1bad"/>"#);
    assert!(err.to_string().contains("process"), "{}", err);
}

// ============================================================================
// Providers
// ============================================================================

#[test]
fn test_provider_permissions_and_children() {
    let parsed = parse(
        33,
        r#"<provider android:name=".Files"
            android:authorities="com.example.app.files;com.example.app.legacy"
            android:permission="com.example.app.ACCESS"
            android:writePermission="com.example.app.WRITE"
            android:grantUriPermissions="false">
            <grant-uri-permission android:pathPrefix="/public"/>
            <path-permission android:path="/secret" android:readPermission="com.example.app.SECRET"/>
        </provider>"#,
    );

    let provider = &parsed.package.providers[0];
    assert_eq!(
        provider.authorities().collect::<Vec<_>>(),
        vec!["com.example.app.files", "com.example.app.legacy"]
    );
    assert_eq!(provider.read_permission.as_deref(), Some("com.example.app.ACCESS"));
    assert_eq!(provider.write_permission.as_deref(), Some("com.example.app.WRITE"));
    assert!(provider.grant_uri_permissions);
    assert_eq!(provider.uri_permission_patterns[0].kind, PatternKind::Prefix);
    assert_eq!(provider.path_permissions[0].pattern.path, "/secret");
    assert_eq!(
        provider.path_permissions[0].read_permission.as_deref(),
        Some("com.example.app.SECRET")
    );
    assert!(!provider.exported);
}

#[test]
fn test_provider_requires_authorities() {
    let err = parse_err(33, r#"<provider android:name=".Files"/>"#);
    assert!(err.to_string().contains("authorities"), "{}", err);
}

#[test]
fn test_legacy_provider_exported_by_default() {
    let parsed = ManifestParser::default()
        .parse_str(
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.app">
                <uses-sdk android:minSdkVersion="9" android:targetSdkVersion="16"/>
                <application>
                    <provider android:name=".Legacy" android:authorities="com.example.app.legacy"/>
                </application>
            </manifest>"#,
        )
        .unwrap();
    assert!(parsed.package.providers[0].exported);
}

// ============================================================================
// Permissions
// ============================================================================

#[test]
fn test_permission_family() {
    let parsed = ManifestParser::default()
        .parse_str(
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.app">
                <permission android:name="com.example.app.READ" android:protectionLevel="dangerous"/>
                <permission android:name="com.example.app.ADMIN" android:protectionLevel="signature|privileged"/>
                <permission-tree android:name="com.example.app.tree"/>
                <permission-group android:name="com.example.app.GROUP"/>
            </manifest>"#,
        )
        .unwrap();

    let pkg = &parsed.package;
    assert_eq!(pkg.permissions.len(), 3);
    assert_eq!(pkg.permissions[0].protection(), protection::DANGEROUS);
    assert!(pkg.permissions[0].is_runtime());
    assert_eq!(pkg.permissions[1].protection(), protection::SIGNATURE);
    assert_ne!(pkg.permissions[1].protection_flags() & protection::FLAG_PRIVILEGED, 0);
    assert!(pkg.permissions[2].tree);
    assert_eq!(pkg.permission_groups[0].name, "com.example.app.GROUP");
}

#[test]
fn test_short_permission_tree_is_rejected() {
    let err = ManifestParser::default()
        .parse_str(
            r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.app">
                <permission-tree android:name="com.example"/>
            </manifest>"#,
        )
        .unwrap_err();
    assert!(err.to_string().contains("permission-tree"), "{}", err);
}
