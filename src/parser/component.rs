//! Shared parsing for every component kind: name, icons, label, meta-data,
//! plus the process-level facets of main components and their intent filters.

use super::intent::parse_intent_info;
use super::names::{build_class_name, build_process_name};
use super::result::{ParseError, ParseResult};
use super::xml::{AttributeSet, RawValue, TagCursor, ValueType};
use super::ParseContext;
use crate::model::package::sdk;
use crate::model::{Component, InstantAppVisibility, IntentFilter, MainComponent, MetaData, MetaValue, ParsedPackage};
use tracing::{debug, warn};

/// Class name reserved for the settings screen of every app
pub const APP_DETAILS_ACTIVITY_CLASS_NAME: &str = "android.app.AppDetailsActivity";

/// Populate the fields shared by all components.
///
/// Fields already present on `component` (an alias inherits its target's
/// icon and label) are only replaced when the tag declares them.
pub fn parse_component<A: AttributeSet + ?Sized>(
    component: &mut Component,
    tag: &str,
    pkg: &ParsedPackage,
    attrs: &A,
    ctx: &ParseContext,
    with_description: bool,
) -> ParseResult<()> {
    let name = attrs
        .get_string("name")
        .ok_or_else(|| ParseError::invalid(format!("{} does not specify android:name", tag)))?;

    let class_name = build_class_name(&pkg.package_name, &name)
        .ok_or_else(|| ParseError::invalid(format!("{} does not specify android:name", tag)))?;
    if class_name == APP_DETAILS_ACTIVITY_CLASS_NAME {
        return Err(ParseError::invalid(format!("{} invalid android:name", tag)));
    }

    component.name = class_name;
    component.package_name = pkg.package_name.clone();

    // Setting an icon drops any inherited literal label
    let round_icon = if ctx.options.use_round_icon {
        attrs.get_resource_id("roundIcon", 0)
    } else {
        0
    };
    let icon = if round_icon != 0 {
        round_icon
    } else {
        attrs.get_resource_id("icon", 0)
    };
    if icon != 0 {
        component.icon = icon;
        component.non_localized_label = None;
    }

    let logo = attrs.get_resource_id("logo", 0);
    if logo != 0 {
        component.logo = logo;
    }
    let banner = attrs.get_resource_id("banner", 0);
    if banner != 0 {
        component.banner = banner;
    }

    if with_description {
        component.description_res = attrs.get_resource_id("description", 0);
    }

    match attrs.peek_value("label") {
        Some(RawValue::Reference { id, .. }) => component.label_res = *id,
        Some(RawValue::Literal(text)) => {
            component.label_res = 0;
            component.non_localized_label = Some(text.clone());
        }
        _ => {}
    }

    Ok(())
}

/// Which optional main-component attributes a tag carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainAttrs {
    pub direct_boot_aware: bool,
    pub enabled: bool,
    pub process: bool,
    pub split_name: bool,
}

impl MainAttrs {
    pub const ALL: MainAttrs = MainAttrs {
        direct_boot_aware: true,
        enabled: true,
        process: true,
        split_name: true,
    };

    /// `<activity-alias>` inherits boot awareness and process from its target
    pub const ALIAS: MainAttrs = MainAttrs {
        direct_boot_aware: false,
        enabled: true,
        process: false,
        split_name: false,
    };
}

pub fn parse_main_component<A: AttributeSet + ?Sized>(
    main: &mut MainComponent,
    tag: &str,
    pkg: &mut ParsedPackage,
    attrs: &A,
    ctx: &ParseContext,
    which: MainAttrs,
) -> ParseResult<()> {
    parse_component(&mut main.component, tag, pkg, attrs, ctx, true)?;

    if which.direct_boot_aware {
        main.direct_boot_aware = attrs.get_bool("directBootAware", false);
        if main.direct_boot_aware {
            pkg.partially_direct_boot_aware = true;
        }
    }

    if which.enabled {
        main.enabled = attrs.get_bool("enabled", true);
    }

    if which.process {
        // Pre-Froyo packages could not point the process at a resource
        let process = if pkg.target_sdk >= sdk::FROYO {
            attrs.get_string("process")
        } else {
            attrs.get_non_resource_string("process")
        };
        main.process_name = build_process_name(
            &pkg.package_name,
            Some(pkg.process_name()),
            process.as_deref(),
            ctx.options.flags,
            &ctx.options.separate_processes,
        )?;
    }

    if which.split_name {
        main.split_name = attrs.get_string("splitName");
    }

    Ok(())
}

/// How a component kind treats its intent filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRules {
    pub allow_globs: bool,
    pub allow_auto_verify: bool,
    pub allow_implicit_visibility: bool,
    /// Drop (with a warning) filters that declare no action
    pub fail_on_no_actions: bool,
}

/// Parse an `<intent-filter>` (or `<preferred>`) owned by a main component
/// and classify its instant-app visibility.
pub fn parse_main_intent_filter<C: TagCursor + ?Sized>(
    component_name: &str,
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
    rules: FilterRules,
    visible_to_instant_apps: bool,
) -> ParseResult<Option<IntentFilter>> {
    let tag = cursor.name().to_string();
    let position = cursor.position();
    let mut filter = parse_intent_info(
        component_name,
        pkg,
        cursor,
        ctx,
        rules.allow_globs,
        rules.allow_auto_verify,
    )?;

    if rules.fail_on_no_actions && filter.count_actions() == 0 {
        warn!(
            "No actions in <{}> of {} at {} in package {}",
            tag, component_name, position, pkg.package_name
        );
        return Ok(None);
    }

    filter.visibility = if visible_to_instant_apps {
        InstantAppVisibility::Explicit
    } else if rules.allow_implicit_visibility && filter.is_implicitly_exposed() {
        InstantAppVisibility::Implicit
    } else {
        InstantAppVisibility::None
    };

    Ok(Some(filter))
}

/// Parse one `<meta-data>` tag into `meta_data` and consume it
pub fn parse_meta_data<C: TagCursor + ?Sized>(
    meta_data: &mut MetaData,
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &ParseContext,
) -> ParseResult<()> {
    let attrs = cursor.attributes().clone();

    let name = attrs
        .get_string("name")
        .ok_or_else(|| ParseError::invalid("<meta-data> requires an android:name attribute"))?;

    let value = match attrs.peek_value("resource") {
        Some(RawValue::Reference { id, .. }) if *id != 0 => Some(MetaValue::Resource(*id)),
        _ => match attrs.peek_value("value") {
            None => {
                return Err(ParseError::invalid(
                    "<meta-data> requires an android:value or android:resource attribute",
                ))
            }
            Some(RawValue::Reference { id, resolved, .. }) => Some(match resolved {
                Some(text) => MetaValue::String(text.clone()),
                None => MetaValue::Resource(*id),
            }),
            Some(_) => match attrs.value_type("value") {
                ValueType::Boolean => Some(MetaValue::Bool(attrs.get_bool("value", false))),
                ValueType::Int => Some(MetaValue::Int(attrs.get_int("value", 0))),
                ValueType::Float => Some(MetaValue::Float(attrs.get_float("value", 0.0))),
                ValueType::String => attrs.get_string("value").map(MetaValue::String),
                _ => {
                    let message = "<meta-data> only supports string, integer, float, color, boolean, and resource reference types";
                    if ctx.options.strict {
                        return Err(ParseError::invalid(message));
                    }
                    warn!(
                        "{}: {} at {} in package {}",
                        message,
                        name,
                        cursor.position(),
                        pkg.package_name
                    );
                    None
                }
            },
        },
    };

    if let Some(value) = value {
        meta_data.insert(name, value);
    }
    cursor.skip_current_tag()
}

/// Children of permissions and instrumentation: `<meta-data>` only
pub fn parse_all_meta_data<C: TagCursor + ?Sized>(
    component: &mut Component,
    tag: &str,
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<()> {
    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        if child == "meta-data" {
            parse_meta_data(&mut component.meta_data, pkg, cursor, ctx)?;
        } else {
            unknown_tag(tag, pkg, cursor, ctx)?;
        }
    }
    Ok(())
}

/// Policy for unrecognized children: an error when strict, otherwise skipped
pub fn unknown_tag<C: TagCursor + ?Sized>(
    parent: &str,
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &ParseContext,
) -> ParseResult<()> {
    let tag = cursor.name().to_string();
    if ctx.options.strict {
        return Err(ParseError::invalid(format!("Bad element under {}: {}", parent, tag)));
    }

    warn!(
        "Unknown element under {}: {} at {} in package {}",
        parent,
        tag,
        cursor.position(),
        pkg.package_name
    );
    cursor.skip_current_tag()
}

/// Tags the parser recognizes but does not model
pub fn skip_known_tag<C: TagCursor + ?Sized>(cursor: &mut C) -> ParseResult<()> {
    debug!("Skipping <{}> at {}", cursor.name(), cursor.position());
    cursor.skip_current_tag()
}

/// OR together the flags whose boolean attribute is set
pub fn fold_flags<F, A>(attrs: &A, table: &[(F, &str, bool)]) -> F
where
    F: bitflags::Flags + Copy,
    A: AttributeSet + ?Sized,
{
    table
        .iter()
        .filter(|(_, attribute, default)| attrs.get_bool(attribute, *default))
        .fold(F::empty(), |flags, (flag, _, _)| flags.union(*flag))
}
