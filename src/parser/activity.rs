//! `<activity>`, `<receiver>` and `<activity-alias>`
//!
//! All three share one routine; [`ActivityKind`] decides which attributes
//! are read and which child tags are accepted.

use super::component::{
    fold_flags, parse_main_component, parse_main_intent_filter, parse_meta_data, skip_known_tag,
    unknown_tag, FilterRules, MainAttrs,
};
use super::names::{build_class_name, build_task_affinity_name};
use super::result::{ParseError, ParseResult};
use super::xml::{AttributeSet, TagAttributes, TagCursor, ValueType};
use super::ParseContext;
use crate::model::activity::{
    config_changes, launch_mode, screen_orientation, COLOR_MODE_DEFAULT, DEFAULT_MAX_RECENTS,
    DOCUMENT_LAUNCH_NONE, GRAVITY_CENTER, PERSIST_ROOT_ONLY, ROTATION_ANIMATION_UNSPECIFIED,
};
use crate::model::{
    Activity, ActivityFlags, IntentFilter, ParsedPackage, PrivateActivityFlags, ResizeMode,
    WindowLayout,
};
use tracing::{error, warn};

/// Meta-data key older apps used before `<layout android:windowLayoutAffinity>`
pub const METADATA_WINDOW_LAYOUT_AFFINITY: &str = "android.activity_window_layout_affinity";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Activity,
    Alias,
    Receiver,
}

impl ActivityKind {
    fn tag(&self) -> &'static str {
        match self {
            ActivityKind::Activity => "<activity>",
            ActivityKind::Alias => "<activity-alias>",
            ActivityKind::Receiver => "<receiver>",
        }
    }

    /// `<preferred>` and `<layout>` are only meaningful on real activities
    fn accepts_activity_children(&self) -> bool {
        *self == ActivityKind::Activity
    }
}

/// Parse the `<activity>` under the cursor
pub fn parse_activity<C: TagCursor + ?Sized>(
    pkg: &mut ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Activity> {
    parse_activity_or_receiver(ActivityKind::Activity, pkg, cursor, ctx)
}

/// Parse the `<receiver>` under the cursor
pub fn parse_receiver<C: TagCursor + ?Sized>(
    pkg: &mut ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Activity> {
    parse_activity_or_receiver(ActivityKind::Receiver, pkg, cursor, ctx)
}

fn parse_activity_or_receiver<C: TagCursor + ?Sized>(
    kind: ActivityKind,
    pkg: &mut ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Activity> {
    let tag = kind.tag();
    let attrs = cursor.attributes().clone();
    let mut activity = Activity::default();

    parse_main_component(&mut activity.main, tag, pkg, &attrs, ctx, MainAttrs::ALL)?;

    if kind == ActivityKind::Receiver
        && pkg.cant_save_state
        && activity.process_name.as_deref() == Some(pkg.package_name.as_str())
    {
        return Err(ParseError::invalid(
            "Heavy-weight applications can not have receivers in main process",
        ));
    }

    activity.theme = attrs.get_resource_id("theme", 0);
    activity.ui_options = attrs.get_int("uiOptions", pkg.ui_options);

    activity.flags |= fold_flags(
        &attrs,
        &[
            (ActivityFlags::ALLOW_TASK_REPARENTING, "allowTaskReparenting", pkg.allow_task_reparenting),
            (ActivityFlags::ALWAYS_RETAIN_TASK_STATE, "alwaysRetainTaskState", false),
            (ActivityFlags::CLEAR_TASK_ON_LAUNCH, "clearTaskOnLaunch", false),
            (ActivityFlags::EXCLUDE_FROM_RECENTS, "excludeFromRecents", false),
            (ActivityFlags::FINISH_ON_CLOSE_SYSTEM_DIALOGS, "finishOnCloseSystemDialogs", false),
            (ActivityFlags::FINISH_ON_TASK_LAUNCH, "finishOnTaskLaunch", false),
            (ActivityFlags::IMMERSIVE, "immersive", false),
            (ActivityFlags::MULTIPROCESS, "multiprocess", false),
            (ActivityFlags::NO_HISTORY, "noHistory", false),
            (ActivityFlags::SHOW_FOR_ALL_USERS, "showForAllUsers", false),
            (ActivityFlags::SHOW_FOR_ALL_USERS, "showOnLockScreen", false),
            (ActivityFlags::STATE_NOT_NEEDED, "stateNotNeeded", false),
            (ActivityFlags::SYSTEM_USER_ONLY, "systemUserOnly", false),
        ],
    );

    if kind == ActivityKind::Receiver {
        activity.launch_mode = launch_mode::STANDARD;
        activity.config_changes = 0;
        activity.flags |= fold_flags(&attrs, &[(ActivityFlags::SINGLE_USER, "singleUser", false)]);
    } else {
        parse_activity_attributes(&mut activity, pkg, &attrs);
    }

    let affinity = attrs.get_string("taskAffinity");
    activity.task_affinity = build_task_affinity_name(
        &pkg.package_name,
        pkg.task_affinity.as_deref(),
        affinity.as_deref(),
    )?;

    let visible_to_instant_apps = attrs.get_bool("visibleToInstantApps", false);
    if visible_to_instant_apps {
        activity.flags |= ActivityFlags::VISIBLE_TO_INSTANT_APP;
        pkg.visible_to_instant_apps = true;
    }

    parse_activity_or_alias(activity, kind, pkg, cursor, &attrs, ctx, visible_to_instant_apps)
}

/// Attributes only activities (not receivers or aliases) declare
fn parse_activity_attributes(activity: &mut Activity, pkg: &ParsedPackage, attrs: &TagAttributes) {
    activity.flags |= fold_flags(
        attrs,
        &[
            (ActivityFlags::HARDWARE_ACCELERATED, "hardwareAccelerated", pkg.base_hardware_accelerated),
            (ActivityFlags::ALLOW_EMBEDDED, "allowEmbedded", false),
            (ActivityFlags::ALWAYS_FOCUSABLE, "alwaysFocusable", false),
            (ActivityFlags::AUTO_REMOVE_FROM_RECENTS, "autoRemoveFromRecents", false),
            (ActivityFlags::RELINQUISH_TASK_IDENTITY, "relinquishTaskIdentity", false),
            (ActivityFlags::RESUME_WHILE_PAUSING, "resumeWhilePausing", false),
            (ActivityFlags::SHOW_WHEN_LOCKED, "showWhenLocked", false),
            (ActivityFlags::SUPPORTS_PICTURE_IN_PICTURE, "supportsPictureInPicture", false),
            (ActivityFlags::TURN_SCREEN_ON, "turnScreenOn", false),
            (ActivityFlags::PREFER_MINIMAL_POST_PROCESSING, "preferMinimalPostProcessing", false),
        ],
    );
    activity.private_flags |= fold_flags(
        attrs,
        &[
            (PrivateActivityFlags::INHERIT_SHOW_WHEN_LOCKED, "inheritShowWhenLocked", false),
            (PrivateActivityFlags::HOME_TRANSITION_SOUND, "playHomeTransitionSound", true),
        ],
    );

    activity.color_mode = attrs.get_int("colorMode", COLOR_MODE_DEFAULT);
    activity.document_launch_mode = attrs.get_int("documentLaunchMode", DOCUMENT_LAUNCH_NONE);
    activity.launch_mode = attrs.get_int("launchMode", launch_mode::STANDARD);
    activity.lock_task_launch_mode = attrs.get_int("lockTaskMode", 0);
    activity.max_recents = attrs.get_int("maxRecents", DEFAULT_MAX_RECENTS);
    activity.persistable_mode = attrs.get_int("persistableMode", PERSIST_ROOT_ONLY);
    activity.requested_vr_component = attrs.get_string("enableVrMode");
    activity.rotation_animation = attrs.get_int("rotationAnimation", ROTATION_ANIMATION_UNSPECIFIED);
    activity.soft_input_mode = attrs.get_int("windowSoftInputMode", 0);
    activity.config_changes = activity_config_changes(
        attrs.get_int("configChanges", 0) as u32,
        attrs.get_int("recreateOnConfigChanges", 0) as u32,
    );
    activity.supports_size_changes = attrs.get_bool("supportsSizeChanges", false);

    let orientation = attrs.get_int("screenOrientation", screen_orientation::UNSPECIFIED);
    let resize_mode = activity_resize_mode(pkg, attrs, orientation);
    activity.screen_orientation = orientation;
    activity.resize_mode = resize_mode;

    if has_numeric_value(attrs, "maxAspectRatio") {
        activity.set_max_aspect_ratio(resize_mode, attrs.get_float("maxAspectRatio", 0.0));
    }
    if has_numeric_value(attrs, "minAspectRatio") {
        activity.set_min_aspect_ratio(resize_mode, attrs.get_float("minAspectRatio", 0.0));
    }
}

fn has_numeric_value(attrs: &TagAttributes, name: &str) -> bool {
    matches!(attrs.value_type(name), ValueType::Float | ValueType::Int)
}

/// Changes in `recreateOnConfigChanges` are the ones the activity does *not* handle
pub fn activity_config_changes(changes: u32, recreate_on_changes: u32) -> u32 {
    changes | (!recreate_on_changes & config_changes::RECREATE_ON_CONFIG_CHANGES_MASK)
}

/// Explicit attribute, then the package default, then the SDK-version flag,
/// then whatever the requested orientation forces.
pub fn activity_resize_mode(pkg: &ParsedPackage, attrs: &TagAttributes, orientation: i32) -> ResizeMode {
    if attrs.has_value("resizeableActivity") || pkg.resizeable_activity.is_some() {
        let default = pkg.resizeable_activity.unwrap_or(false);
        return if attrs.get_bool("resizeableActivity", default) {
            ResizeMode::Resizeable
        } else {
            ResizeMode::Unresizeable
        };
    }

    if pkg.resizeable_activity_via_sdk_version {
        return ResizeMode::ResizeableViaSdkVersion;
    }

    if screen_orientation::is_fixed_portrait(orientation) {
        ResizeMode::ForceResizablePortraitOnly
    } else if screen_orientation::is_fixed_landscape(orientation) {
        ResizeMode::ForceResizableLandscapeOnly
    } else if orientation == screen_orientation::LOCKED {
        ResizeMode::ForceResizablePreserveOrientation
    } else {
        ResizeMode::ForceResizeable
    }
}

/// Parse the `<activity-alias>` under the cursor. Its target must already
/// be among the package's activities.
pub fn parse_activity_alias<C: TagCursor + ?Sized>(
    pkg: &mut ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Activity> {
    let attrs = cursor.attributes().clone();
    let tag = ActivityKind::Alias.tag();

    let target_name = attrs.get_string("targetActivity").ok_or_else(|| {
        ParseError::invalid("<activity-alias> does not specify android:targetActivity")
    })?;
    let target_name = build_class_name(&pkg.package_name, &target_name).ok_or_else(|| {
        ParseError::invalid(format!("Empty class name in package {}", pkg.package_name))
    })?;

    let target = pkg.find_activity(&target_name).ok_or_else(|| {
        ParseError::invalid(format!(
            "<activity-alias> target activity {} not found in manifest",
            target_name
        ))
    })?;
    let mut alias = Activity::make_alias(target_name, target);

    parse_main_component(&mut alias.main, tag, pkg, &attrs, ctx, MainAttrs::ALIAS)?;

    let visible_to_instant_apps = alias.flags.contains(ActivityFlags::VISIBLE_TO_INSTANT_APP);
    parse_activity_or_alias(alias, ActivityKind::Alias, pkg, cursor, &attrs, ctx, visible_to_instant_apps)
}

/// Shared tail: parent activity, permission, exported and the child tags
fn parse_activity_or_alias<C: TagCursor + ?Sized>(
    mut activity: Activity,
    kind: ActivityKind,
    pkg: &mut ParsedPackage,
    cursor: &mut C,
    attrs: &TagAttributes,
    ctx: &mut ParseContext,
    visible_to_instant_apps: bool,
) -> ParseResult<Activity> {
    if let Some(parent) = attrs.get_string("parentActivityName") {
        match build_class_name(&pkg.package_name, &parent) {
            Some(parent) => activity.parent_activity_name = Some(parent),
            None => error!(
                "Activity {} specified invalid parentActivityName {}",
                activity.name, parent
            ),
        }
    }

    // An alias only requires the permission it declares itself
    let permission = attrs.get_string("permission");
    activity.permission = match kind {
        ActivityKind::Alias => permission,
        _ => permission.or_else(|| pkg.permission.clone()),
    };

    let explicit_exported = attrs.has_value("exported");
    if explicit_exported {
        activity.main.exported = attrs.get_bool("exported", false);
    }

    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        match child.as_str() {
            "intent-filter" => {
                let allow_implicit = kind != ActivityKind::Receiver;
                if let Some(filter) =
                    parse_activity_filter(&mut activity, pkg, cursor, ctx, allow_implicit, visible_to_instant_apps)?
                {
                    activity.main.add_intent(filter);
                }
            }
            "meta-data" => parse_meta_data(&mut activity.main.component.meta_data, pkg, cursor, ctx)?,
            "property" => skip_known_tag(cursor)?,
            "preferred" if kind.accepts_activity_children() => {
                if let Some(filter) =
                    parse_activity_filter(&mut activity, pkg, cursor, ctx, true, visible_to_instant_apps)?
                {
                    pkg.add_preferred_activity_filter(&activity.name, filter);
                }
            }
            "layout" if kind.accepts_activity_children() => {
                activity.window_layout = Some(parse_window_layout(cursor.attributes()));
                cursor.skip_current_tag()?;
            }
            _ => unknown_tag(kind.tag(), pkg, cursor, ctx)?,
        }
    }

    resolve_window_layout(&mut activity);

    if !explicit_exported {
        activity.main.exported = !activity.intents.is_empty();
    }

    Ok(activity)
}

fn parse_activity_filter<C: TagCursor + ?Sized>(
    activity: &mut Activity,
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
    allow_implicit_visibility: bool,
    visible_to_instant_apps: bool,
) -> ParseResult<Option<IntentFilter>> {
    let rules = FilterRules {
        allow_globs: true,
        allow_auto_verify: true,
        allow_implicit_visibility,
        fail_on_no_actions: true,
    };
    let filter = parse_main_intent_filter(&activity.name, pkg, cursor, ctx, rules, visible_to_instant_apps)?;

    if let Some(filter) = &filter {
        if filter.is_visible_to_instant_app() {
            activity.flags |= ActivityFlags::VISIBLE_TO_INSTANT_APP;
        }
        if filter.is_implicitly_visible_to_instant_app() {
            activity.flags |= ActivityFlags::IMPLICITLY_VISIBLE_TO_INSTANT_APP;
        }
    }
    Ok(filter)
}

/// `<layout>`: sizes are either fractions of the screen or dimensions
fn parse_window_layout(attrs: &TagAttributes) -> WindowLayout {
    let mut layout = WindowLayout {
        gravity: attrs.get_int("gravity", GRAVITY_CENTER),
        min_width: attrs.get_dimension_pixel_size("minWidth", -1),
        min_height: attrs.get_dimension_pixel_size("minHeight", -1),
        window_layout_affinity: attrs.get_string("windowLayoutAffinity"),
        ..WindowLayout::from_affinity(String::new())
    };

    match attrs.value_type("defaultWidth") {
        ValueType::Fraction => layout.width_fraction = attrs.get_fraction("defaultWidth", 1.0, 1.0, -1.0),
        ValueType::Dimension => layout.width = attrs.get_dimension_pixel_size("defaultWidth", -1),
        _ => {}
    }
    match attrs.value_type("defaultHeight") {
        ValueType::Fraction => layout.height_fraction = attrs.get_fraction("defaultHeight", 1.0, 1.0, -1.0),
        ValueType::Dimension => layout.height = attrs.get_dimension_pixel_size("defaultHeight", -1),
        _ => {}
    }

    layout
}

/// Fall back to the legacy meta-data affinity when `<layout>` gave none
fn resolve_window_layout(activity: &mut Activity) {
    let affinity = match activity.meta_data.get_string(METADATA_WINDOW_LAYOUT_AFFINITY) {
        Some(affinity) => affinity.to_string(),
        None => return,
    };

    if let Some(layout) = activity.window_layout.as_mut() {
        if layout.window_layout_affinity.is_none() {
            layout.window_layout_affinity = Some(affinity);
        }
        return;
    }

    warn!(
        "{} uses deprecated {} meta-data",
        activity.name, METADATA_WINDOW_LAYOUT_AFFINITY
    );
    activity.window_layout = Some(WindowLayout::from_affinity(affinity));
}
