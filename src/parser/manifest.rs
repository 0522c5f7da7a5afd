use super::activity::{parse_activity, parse_activity_alias, parse_receiver};
use super::attribution::parse_attribution;
use super::component::{parse_meta_data, skip_known_tag, unknown_tag};
use super::instrumentation::parse_instrumentation;
use super::names::{build_class_name, build_process_name, build_task_affinity_name, validate_name};
use super::permission::{parse_permission, parse_permission_group, parse_permission_tree};
use super::process::parse_processes;
use super::provider::parse_provider;
use super::result::{DeferredError, ParseError, ParseResult};
use super::service::parse_service;
use super::xml::{AttributeSet, ResourceTable, TagAttributes, TagCursor, XmlCursor};
use super::{ParseContext, ParseOptions};
use crate::model::attribution::is_combination_valid;
use crate::model::package::sdk;
use crate::model::ParsedPackage;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Manifest-level tags that carry nothing the component model keeps
const UNMODELED_MANIFEST_TAGS: &[&str] = &[
    "uses-permission",
    "uses-permission-sdk-23",
    "uses-permission-sdk-m",
    "uses-feature",
    "feature-group",
    "uses-configuration",
    "uses-split",
    "supports-screens",
    "compatible-screens",
    "supports-input",
    "protected-broadcast",
    "original-package",
    "adopt-permissions",
    "key-sets",
    "overlay",
    "restrict-update",
    "package-verifier",
    "queries",
    "eat-comment",
];

/// Application-level tags that carry nothing the component model keeps
const UNMODELED_APPLICATION_TAGS: &[&str] = &[
    "uses-library",
    "uses-static-library",
    "uses-native-library",
    "uses-sdk-library",
    "uses-package",
    "static-library",
    "sdk-library",
    "library",
    "profileable",
    "property",
    "apex-system-service",
];

/// Result of parsing one `AndroidManifest.xml`
#[derive(Debug, Clone, Serialize)]
pub struct ParsedManifest {
    pub package: ParsedPackage,
    /// Problems tolerated because of the package's target SDK
    pub deferred_errors: Vec<DeferredError>,
    /// Ids handed out to `@type/name` references
    #[serde(flatten)]
    pub resources: ResourceTable,
}

/// Parser for AndroidManifest.xml files
#[derive(Debug, Clone, Default)]
pub struct ManifestParser {
    options: ParseOptions,
    strings: BTreeMap<String, String>,
}

impl ManifestParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            strings: BTreeMap::new(),
        }
    }

    /// Values for `@string/name` references
    pub fn with_strings(mut self, strings: BTreeMap<String, String>) -> Self {
        self.strings = strings;
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse manifest text
    pub fn parse_str(&self, contents: &str) -> ParseResult<ParsedManifest> {
        let resources = ResourceTable::with_strings(self.strings.clone());
        let mut cursor = XmlCursor::with_resources(contents, resources);
        let mut ctx = ParseContext::new(self.options.clone());

        if !cursor.advance_to_start_tag()? {
            return Err(ParseError::invalid("No <manifest> element found"));
        }
        if cursor.name() != "manifest" {
            return Err(ParseError::invalid(format!(
                "Expected <manifest> as the root element, found <{}>",
                cursor.name()
            )));
        }

        let package = parse_manifest(&mut cursor, &mut ctx)?;

        Ok(ParsedManifest {
            package,
            deferred_errors: ctx.input.into_deferred_errors(),
            resources: cursor.into_resources(),
        })
    }

    /// Parse manifest text read from `path`, attaching the path to any error
    pub fn parse(&self, path: &Path, contents: &str) -> Result<ParsedManifest> {
        let manifest = self
            .parse_str(contents)
            .map_err(|e| miette::Report::new(e).wrap_err(format!("Failed to parse {}", path.display())))?;

        debug!(
            "Parsed {} ({}): {} components",
            path.display(),
            manifest.package.package_name,
            manifest.package.component_count()
        );
        Ok(manifest)
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedManifest> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read manifest: {}", path.display()))?;
        self.parse(path, &contents)
    }
}

/// Walk `<manifest>` and everything under it
fn parse_manifest<C: TagCursor + ?Sized>(
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<ParsedPackage> {
    // `package` lives outside the android namespace
    let package_name = cursor
        .attribute_value(None, "package")
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ParseError::invalid("<manifest> does not specify package"))?;
    validate_name(&package_name, true).map_err(|reason| {
        ParseError::invalid(format!(
            "<manifest> specifies bad package name \"{}\": {}",
            package_name, reason
        ))
    })?;

    let mut pkg = ParsedPackage::new(package_name);
    let mut found_application = false;

    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        match child.as_str() {
            "uses-sdk" => parse_uses_sdk(&mut pkg, cursor, ctx)?,
            "application" => {
                if found_application {
                    return Err(ParseError::invalid("<manifest> has more than one <application>"));
                }
                found_application = true;
                parse_application(&mut pkg, cursor, ctx)?;
            }
            "permission" => {
                let permission = parse_permission(&pkg, cursor, ctx)?;
                pkg.permissions.push(permission);
            }
            "permission-tree" => {
                let tree = parse_permission_tree(&pkg, cursor, ctx)?;
                pkg.permissions.push(tree);
            }
            "permission-group" => {
                let group = parse_permission_group(&pkg, cursor, ctx)?;
                pkg.permission_groups.push(group);
            }
            "instrumentation" => {
                let instrumentation = parse_instrumentation(&pkg, cursor, ctx)?;
                pkg.instrumentations.push(instrumentation);
            }
            "attribution" => pkg.attributions.push(parse_attribution(cursor)?),
            tag if UNMODELED_MANIFEST_TAGS.contains(&tag) => skip_known_tag(cursor)?,
            _ => unknown_tag("<manifest>", &pkg, cursor, ctx)?,
        }
    }

    if !is_combination_valid(&pkg.attributions) {
        return Err(ParseError::invalid("Combination <attribution> tags are not valid"));
    }
    pkg.assert_processes_are_valid().map_err(ParseError::Invalid)?;

    Ok(pkg)
}

/// Numeric version, or a codename for an in-development platform
fn sdk_version(attrs: &TagAttributes, name: &str) -> Option<u32> {
    let text = attrs.get_string(name)?;
    Some(text.trim().parse().unwrap_or(sdk::CUR_DEVELOPMENT))
}

fn parse_uses_sdk<C: TagCursor + ?Sized>(
    pkg: &mut ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<()> {
    let attrs = cursor.attributes().clone();

    pkg.min_sdk = sdk_version(&attrs, "minSdkVersion").unwrap_or(1);
    pkg.target_sdk = sdk_version(&attrs, "targetSdkVersion").unwrap_or(pkg.min_sdk);
    debug!(
        "{} targets SDK {} (min {})",
        pkg.package_name, pkg.target_sdk, pkg.min_sdk
    );

    ctx.input.enable_deferred_errors(pkg.target_sdk)?;
    cursor.skip_current_tag()
}

fn parse_application<C: TagCursor + ?Sized>(
    pkg: &mut ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<()> {
    let attrs = cursor.attributes().clone();

    if let Some(name) = attrs.get_string("name") {
        pkg.class_name = build_class_name(&pkg.package_name, &name);
    }
    pkg.permission = attrs.get_string("permission");
    pkg.task_affinity = build_task_affinity_name(
        &pkg.package_name,
        Some(&pkg.package_name),
        attrs.get_string("taskAffinity").as_deref(),
    )?;

    pkg.cant_save_state = attrs.get_bool("cantSaveState", false);
    let process = if pkg.target_sdk >= sdk::FROYO {
        attrs.get_string("process")
    } else {
        attrs.get_non_resource_string("process")
    };
    pkg.process_name = build_process_name(
        &pkg.package_name,
        None,
        process.as_deref(),
        ctx.options.flags,
        &ctx.options.separate_processes,
    )?;
    if pkg.cant_save_state
        && pkg
            .process_name
            .as_deref()
            .map_or(false, |process| process != pkg.package_name)
    {
        return Err(ParseError::invalid(
            "cantSaveState applications can not use custom processes",
        ));
    }

    if attrs.has_value("resizeableActivity") {
        pkg.resizeable_activity = Some(attrs.get_bool("resizeableActivity", true));
    } else {
        pkg.resizeable_activity_via_sdk_version = pkg.target_sdk >= sdk::N;
    }
    pkg.base_hardware_accelerated =
        attrs.get_bool("hardwareAccelerated", pkg.target_sdk >= sdk::ICE_CREAM_SANDWICH);
    pkg.ui_options = attrs.get_int("uiOptions", 0);
    pkg.allow_task_reparenting = attrs.get_bool("allowTaskReparenting", false);
    pkg.direct_boot_aware = attrs.get_bool("directBootAware", false);

    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        match child.as_str() {
            "activity" => {
                let activity = parse_activity(pkg, cursor, ctx)?;
                pkg.activities.push(activity);
            }
            "activity-alias" => {
                let alias = parse_activity_alias(pkg, cursor, ctx)?;
                pkg.activities.push(alias);
            }
            "receiver" => {
                let receiver = parse_receiver(pkg, cursor, ctx)?;
                pkg.receivers.push(receiver);
            }
            "service" => {
                let service = parse_service(pkg, cursor, ctx)?;
                pkg.services.push(service);
            }
            "provider" => {
                let provider = parse_provider(pkg, cursor, ctx)?;
                pkg.providers.push(provider);
            }
            "processes" => {
                let processes = parse_processes(pkg, cursor, ctx)?;
                for (name, process) in processes {
                    if pkg.processes.contains_key(&name) {
                        return Err(ParseError::invalid(format!(
                            "<process> specified existing name '{}'",
                            name
                        )));
                    }
                    pkg.processes.insert(name, process);
                }
            }
            "meta-data" => {
                let mut meta_data = std::mem::take(&mut pkg.meta_data);
                parse_meta_data(&mut meta_data, pkg, cursor, ctx)?;
                pkg.meta_data = meta_data;
            }
            tag if UNMODELED_APPLICATION_TAGS.contains(&tag) => skip_known_tag(cursor)?,
            _ => unknown_tag("<application>", pkg, cursor, ctx)?,
        }
    }

    pkg.sort_components_by_order();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetaValue, ResizeMode};
    use crate::parser::DeferredErrorKind;

    fn manifest(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example">
{}
</manifest>"#,
            body
        )
    }

    fn parse(body: &str) -> ParseResult<ParsedManifest> {
        ManifestParser::default().parse_str(&manifest(body))
    }

    #[test]
    fn test_minimal_manifest() {
        let parsed = parse(
            r#"<uses-sdk android:minSdkVersion="21" android:targetSdkVersion="33"/>
            <application android:name=".App">
                <activity android:name=".Main">
                    <intent-filter>
                        <action android:name="android.intent.action.MAIN"/>
                        <category android:name="android.intent.category.LAUNCHER"/>
                    </intent-filter>
                </activity>
            </application>"#,
        )
        .unwrap();

        let pkg = &parsed.package;
        assert_eq!(pkg.package_name, "com.example");
        assert_eq!(pkg.min_sdk, 21);
        assert_eq!(pkg.target_sdk, 33);
        assert_eq!(pkg.class_name.as_deref(), Some("com.example.App"));
        assert_eq!(pkg.task_affinity.as_deref(), Some("com.example"));
        assert!(pkg.base_hardware_accelerated);
        assert!(pkg.resizeable_activity_via_sdk_version);
        assert_eq!(pkg.activities.len(), 1);
        assert!(pkg.activities[0].exported);
        assert_eq!(pkg.activities[0].process_name.as_deref(), Some("com.example"));
    }

    #[test]
    fn test_package_is_required_and_validated() {
        let err = ManifestParser::default()
            .parse_str(r#"<manifest><application/></manifest>"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "<manifest> does not specify package");

        let err = ManifestParser::default()
            .parse_str(r#"<manifest package="example"/>"#)
            .unwrap_err();
        assert!(err.to_string().contains("must have at least one '.' separator"));
    }

    #[test]
    fn test_single_application() {
        let err = parse("<application/><application/>").unwrap_err();
        assert_eq!(err.to_string(), "<manifest> has more than one <application>");
    }

    #[test]
    fn test_target_sdk_defaults_to_min() {
        let parsed = parse(r#"<uses-sdk android:minSdkVersion="10"/><application/>"#).unwrap();
        assert_eq!(parsed.package.target_sdk, 10);
        assert!(!parsed.package.base_hardware_accelerated);
        assert!(!parsed.package.resizeable_activity_via_sdk_version);

        let parsed = parse(r#"<uses-sdk android:targetSdkVersion="UpsideDownCake"/>"#).unwrap();
        assert_eq!(parsed.package.target_sdk, sdk::CUR_DEVELOPMENT);
    }

    #[test]
    fn test_deferred_errors_follow_target_sdk() {
        let body = r#"<uses-sdk android:targetSdkVersion="{sdk}"/>
            <application>
                <receiver android:name=".R">
                    <intent-filter><action android:name=""/></intent-filter>
                </receiver>
            </application>"#;

        let parsed = parse(&body.replace("{sdk}", "29")).unwrap();
        assert_eq!(parsed.deferred_errors.len(), 1);
        assert_eq!(
            parsed.deferred_errors[0].kind,
            DeferredErrorKind::EmptyIntentActionCategory
        );

        let err = parse(&body.replace("{sdk}", "30")).unwrap_err();
        assert!(err.is_deferred());

        let mut options = ParseOptions::default();
        options.tolerate_deferred_errors = true;
        let parsed = ManifestParser::new(options)
            .parse_str(&manifest(&body.replace("{sdk}", "34")))
            .unwrap();
        assert_eq!(parsed.deferred_errors.len(), 1);
    }

    #[test]
    fn test_cant_save_state_rejects_custom_process() {
        let err = parse(
            r#"<uses-sdk android:targetSdkVersion="33"/>
            <application android:cantSaveState="true" android:process=":ui"/>"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "cantSaveState applications can not use custom processes");
    }

    #[test]
    fn test_application_attributes() {
        let parsed = parse(
            r#"<uses-sdk android:targetSdkVersion="23"/>
            <application android:process=":main" android:permission="com.example.APP"
                android:resizeableActivity="false" android:uiOptions="splitActionBarWhenNarrow"
                android:taskAffinity="">
                <meta-data android:name="com.example.flag" android:value="true"/>
                <service android:name=".S"/>
            </application>"#,
        )
        .unwrap();

        let pkg = &parsed.package;
        assert_eq!(pkg.process_name.as_deref(), Some("com.example:main"));
        assert_eq!(pkg.task_affinity, None);
        assert_eq!(pkg.resizeable_activity, Some(false));
        assert_eq!(pkg.ui_options, 1);
        assert_eq!(pkg.meta_data.get("com.example.flag"), Some(&MetaValue::Bool(true)));
        assert_eq!(pkg.services[0].permission.as_deref(), Some("com.example.APP"));
        assert_eq!(pkg.services[0].process_name.as_deref(), Some("com.example:main"));
    }

    #[test]
    fn test_alias_requires_declared_target() {
        let parsed = parse(
            r#"<uses-sdk android:targetSdkVersion="23"/>
            <application>
                <activity android:name=".Main" android:screenOrientation="portrait"/>
                <activity-alias android:name=".Shortcut" android:targetActivity=".Main"/>
            </application>"#,
        )
        .unwrap();
        let alias = &parsed.package.activities[1];
        assert_eq!(alias.name, "com.example.Shortcut");
        assert_eq!(alias.target_activity.as_deref(), Some("com.example.Main"));
        assert_eq!(alias.resize_mode, ResizeMode::ForceResizablePortraitOnly);

        let err = parse(
            r#"<application><activity-alias android:name=".Shortcut" android:targetActivity=".Missing"/></application>"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("com.example.Missing not found"));
    }

    #[test]
    fn test_components_sorted_by_order() {
        let parsed = parse(
            r#"<application>
                <receiver android:name=".Low"><intent-filter android:order="1"><action android:name="a"/></intent-filter></receiver>
                <receiver android:name=".Plain"/>
                <receiver android:name=".High"><intent-filter android:order="9"><action android:name="a"/></intent-filter></receiver>
            </application>"#,
        )
        .unwrap();
        let names: Vec<_> = parsed.package.receivers.iter().map(|r| r.short_name()).collect();
        assert_eq!(names, vec!["High", "Low", "Plain"]);
    }

    #[test]
    fn test_processes_must_cover_components() {
        let body = r#"<application>
                <processes>
                    <process android:process="com.example"/>
                    {extra}
                </processes>
                <service android:name=".Remote" android:process=":remote"/>
            </application>"#;

        let err = parse(&body.replace("{extra}", "")).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Can't install because service com.example.Remote's process attribute com.example:remote"));

        let parsed = parse(&body.replace("{extra}", r#"<process android:process=":remote"/>"#)).unwrap();
        assert_eq!(parsed.package.processes.len(), 2);
    }

    #[test]
    fn test_repeated_processes_blocks_merge_without_duplicates() {
        let merged = parse(
            r#"<application>
                <processes><process android:process="com.example"/></processes>
                <processes>
                    <process android:process=":a">
                        <deny-permission android:name="android.permission.INTERNET"/>
                    </process>
                </processes>
            </application>"#,
        )
        .unwrap();
        assert_eq!(merged.package.processes.len(), 2);
        assert!(merged.package.processes["com.example:a"].denies("android.permission.INTERNET"));

        let err = parse(
            r#"<application>
                <processes>
                    <process android:process="com.example"/>
                    <process android:process=":a">
                        <deny-permission android:name="android.permission.INTERNET"/>
                    </process>
                </processes>
                <processes><process android:process=":a"/></processes>
            </application>"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "<process> specified existing name 'com.example:a'");
    }

    #[test]
    fn test_pre_froyo_process_reference_ignored() {
        let mut strings = BTreeMap::new();
        strings.insert("proc".to_string(), ":p".to_string());
        let parser = ManifestParser::default().with_strings(strings);

        let service_process = |target_sdk: u32| {
            let parsed = parser
                .parse_str(&manifest(&format!(
                    r#"<uses-sdk android:minSdkVersion="4" android:targetSdkVersion="{}"/>
                    <application>
                        <service android:name=".Worker" android:process="@string/proc"/>
                    </application>"#,
                    target_sdk
                )))
                .unwrap();
            parsed.package.services[0].process_name.clone()
        };

        assert_eq!(service_process(7).as_deref(), Some("com.example"));
        assert_eq!(service_process(8).as_deref(), Some("com.example:p"));
    }

    #[test]
    fn test_attribution_combination_checked() {
        let err = parse(
            r#"<attribution android:tag="a" android:label="@string/a"/>
            <attribution android:tag="a" android:label="@string/b"/>"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Combination <attribution> tags are not valid");
    }

    #[test]
    fn test_unknown_tags_skipped_unless_strict() {
        let body = r#"<uses-permission android:name="android.permission.INTERNET"/>
            <mystery><nested/></mystery>
            <application><activity android:name=".A"/></application>"#;

        let parsed = parse(body).unwrap();
        assert_eq!(parsed.package.activities.len(), 1);

        let err = ManifestParser::new(ParseOptions::default().strict(true))
            .parse_str(&manifest(body))
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad element under <manifest>: mystery");
    }

    #[test]
    fn test_string_resources_resolve() {
        let mut strings = BTreeMap::new();
        strings.insert("provider_authority".to_string(), "com.example.files".to_string());

        let parsed = ManifestParser::default()
            .with_strings(strings)
            .parse_str(&manifest(
                r#"<application>
                    <provider android:name=".Files" android:authorities="@string/provider_authority"/>
                </application>"#,
            ))
            .unwrap();
        assert_eq!(parsed.package.providers[0].authority, "com.example.files");
        assert!(!parsed.resources.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_reported() {
        let err = ManifestParser::default()
            .parse_str(r#"<manifest package="com.example"><application></manifest>"#)
            .unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }));
    }

    #[test]
    fn test_wrong_root_element() {
        let err = ManifestParser::default().parse_str("<resources/>").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected <manifest> as the root element, found <resources>"
        );
    }
}
