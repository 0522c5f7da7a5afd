use super::component::unknown_tag;
use super::result::{DeferredErrorKind, ParseError, ParseResult};
use super::xml::{AttributeSet, RawValue, TagAttributes, TagCursor, ANDROID_NAMESPACE};
use super::ParseContext;
use crate::model::intent::CATEGORY_DEFAULT;
use crate::model::{Authority, IntentFilter, ParsedPackage, PatternKind, PatternMatcher};

const NO_NAME: &str = "No value supplied for <android:name>";

/// Parse the `<intent-filter>` (or `<preferred>`) under the cursor, children
/// included. Visibility is left for the owning component to decide.
pub fn parse_intent_info<C: TagCursor + ?Sized>(
    component_name: &str,
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
    allow_globs: bool,
    allow_auto_verify: bool,
) -> ParseResult<IntentFilter> {
    let attrs = cursor.attributes().clone();
    let mut filter = IntentFilter::new();

    filter.priority = attrs.get_int("priority", 0);
    filter.order = attrs.get_int("order", 0);

    match attrs.peek_value("label") {
        Some(RawValue::Reference { id, .. }) => filter.label_res = *id,
        Some(RawValue::Literal(text)) => filter.non_localized_label = Some(text.clone()),
        _ => {}
    }

    if ctx.options.use_round_icon {
        filter.icon = attrs.get_resource_id("roundIcon", 0);
    }
    if filter.icon == 0 {
        filter.icon = attrs.get_resource_id("icon", 0);
    }

    if allow_auto_verify {
        filter.auto_verify = attrs.get_bool("autoVerify", false);
    }

    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        match child.as_str() {
            "action" => {
                let name = required_name(cursor)?;
                filter.add_action(&name);
                if name.is_empty() {
                    ctx.input
                        .defer_error(NO_NAME, DeferredErrorKind::EmptyIntentActionCategory)?;
                }
                cursor.skip_current_tag()?;
            }
            "category" => {
                let name = required_name(cursor)?;
                filter.add_category(&name);
                if name.is_empty() {
                    ctx.input
                        .defer_error(NO_NAME, DeferredErrorKind::EmptyIntentActionCategory)?;
                }
                cursor.skip_current_tag()?;
            }
            "data" => {
                let data = cursor.attributes().clone();
                parse_data(&mut filter, &data, allow_globs)?;
                cursor.skip_current_tag()?;
            }
            _ => unknown_tag("<intent-filter>", pkg, cursor, ctx)?,
        }
    }

    filter.has_default = filter.has_category(CATEGORY_DEFAULT);
    tracing::trace!(
        "Parsed intent filter for {} with {} actions",
        component_name,
        filter.count_actions()
    );
    Ok(filter)
}

/// `android:name` read straight from the tag, so an empty value stays empty
fn required_name<C: TagCursor + ?Sized>(cursor: &C) -> ParseResult<String> {
    cursor
        .attribute_value(Some(ANDROID_NAMESPACE), "name")
        .map(str::to_string)
        .ok_or_else(|| ParseError::invalid(NO_NAME))
}

fn pattern(path: String, kind: PatternKind) -> ParseResult<PatternMatcher> {
    PatternMatcher::new(path, kind).map_err(ParseError::Invalid)
}

/// Add everything a `<data>` tag declares
fn parse_data(filter: &mut IntentFilter, attrs: &TagAttributes, allow_globs: bool) -> ParseResult<()> {
    if let Some(mime) = attrs.get_string("mimeType") {
        filter.add_data_type(&mime).map_err(ParseError::Invalid)?;
    }

    if let Some(group) = attrs.get_string("mimeGroup") {
        filter.add_mime_group(&group);
    }

    if let Some(scheme) = attrs.get_string("scheme") {
        filter.add_data_scheme(&scheme);
    }

    if let Some(ssp) = attrs.get_string("ssp") {
        filter.add_scheme_specific_part(PatternMatcher::literal(ssp));
    }
    if let Some(prefix) = attrs.get_string("sspPrefix") {
        filter.add_scheme_specific_part(pattern(prefix, PatternKind::Prefix)?);
    }
    if let Some(glob) = attrs.get_string("sspPattern") {
        if !allow_globs {
            return Err(ParseError::invalid("sspPattern not allowed here; ssp must be literal"));
        }
        filter.add_scheme_specific_part(pattern(glob, PatternKind::SimpleGlob)?);
    }

    if let Some(host) = attrs.get_string("host") {
        let port = attrs.get_string("port");
        let authority = Authority::new(&host, port.as_deref()).map_err(ParseError::Invalid)?;
        filter.add_authority(authority);
    }

    if let Some(path) = attrs.get_string("path") {
        filter.add_path(PatternMatcher::literal(path));
    }
    if let Some(prefix) = attrs.get_string("pathPrefix") {
        filter.add_path(pattern(prefix, PatternKind::Prefix)?);
    }
    if let Some(suffix) = attrs.get_string("pathSuffix") {
        filter.add_path(pattern(suffix, PatternKind::Suffix)?);
    }
    for (attribute, kind) in [
        ("pathPattern", PatternKind::SimpleGlob),
        ("pathAdvancedPattern", PatternKind::AdvancedGlob),
    ] {
        if let Some(glob) = attrs.get_string(attribute) {
            if !allow_globs {
                return Err(ParseError::invalid(format!(
                    "{} not allowed here; path must be literal",
                    attribute
                )));
            }
            filter.add_path(pattern(glob, kind)?);
        }
    }

    Ok(())
}
