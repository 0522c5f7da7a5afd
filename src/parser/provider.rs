use super::component::{
    fold_flags, parse_main_component, parse_main_intent_filter, parse_meta_data, skip_known_tag,
    unknown_tag, FilterRules, MainAttrs,
};
use super::result::{ParseError, ParseResult};
use super::xml::{AttributeSet, TagAttributes, TagCursor};
use super::ParseContext;
use crate::model::package::sdk;
use crate::model::{ParsedPackage, PathPermission, PatternKind, PatternMatcher, Provider, ProviderFlags};
use tracing::warn;

const TAG: &str = "<provider>";

const PROVIDER_FILTERS: FilterRules = FilterRules {
    allow_globs: true,
    allow_auto_verify: false,
    allow_implicit_visibility: false,
    fail_on_no_actions: false,
};

/// Parse the `<provider>` under the cursor
pub fn parse_provider<C: TagCursor + ?Sized>(
    pkg: &mut ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Provider> {
    let attrs = cursor.attributes().clone();
    let mut provider = Provider::default();

    parse_main_component(&mut provider.main, TAG, pkg, &attrs, ctx, MainAttrs::ALL)?;

    let authority = attrs.get_string("authorities");
    provider.syncable = attrs.get_bool("syncable", false);

    let explicit_exported = attrs.has_value("exported");
    if explicit_exported {
        provider.main.exported = attrs.get_bool("exported", false);
    }

    // read/write permission -> shared permission -> package permission
    let permission = attrs.get_string("permission");
    provider.read_permission = attrs
        .get_string("readPermission")
        .or_else(|| permission.clone())
        .or_else(|| pkg.permission.clone());
    provider.write_permission = attrs
        .get_string("writePermission")
        .or(permission)
        .or_else(|| pkg.permission.clone());

    provider.grant_uri_permissions = attrs.get_bool("grantUriPermissions", false);
    provider.force_uri_permissions = attrs.get_bool("forceUriPermissions", false);
    provider.multi_process = attrs.get_bool("multiprocess", false);
    provider.init_order = attrs.get_int("initOrder", 0);
    provider.flags |= fold_flags(&attrs, &[(ProviderFlags::SINGLE_USER, "singleUser", false)]);

    let visible_to_instant_apps = attrs.get_bool("visibleToInstantApps", false);
    if visible_to_instant_apps {
        provider.flags |= ProviderFlags::VISIBLE_TO_INSTANT_APP;
        pkg.visible_to_instant_apps = true;
    }

    if pkg.cant_save_state && provider.process_name.as_deref() == Some(pkg.package_name.as_str()) {
        return Err(ParseError::invalid(
            "Heavy-weight applications can not have providers in main process",
        ));
    }

    let authority = authority
        .ok_or_else(|| ParseError::invalid("<provider> does not include authorities attribute"))?;
    if authority.is_empty() {
        return Err(ParseError::invalid("<provider> has empty authorities attribute"));
    }
    provider.authority = authority;

    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        match child.as_str() {
            "intent-filter" => {
                let filter = parse_main_intent_filter(
                    &provider.name,
                    pkg,
                    cursor,
                    ctx,
                    PROVIDER_FILTERS,
                    visible_to_instant_apps,
                )?;
                if let Some(filter) = filter {
                    provider.main.add_intent(filter);
                }
            }
            "meta-data" => parse_meta_data(&mut provider.main.component.meta_data, pkg, cursor, ctx)?,
            "property" => skip_known_tag(cursor)?,
            "grant-uri-permission" => {
                let attrs = cursor.attributes().clone();
                parse_grant_uri_permission(&mut provider, &attrs, pkg, cursor.position(), ctx)?;
                cursor.skip_current_tag()?;
            }
            "path-permission" => {
                let attrs = cursor.attributes().clone();
                parse_path_permission(&mut provider, &attrs, pkg, cursor.position(), ctx)?;
                cursor.skip_current_tag()?;
            }
            _ => unknown_tag(TAG, pkg, cursor, ctx)?,
        }
    }

    if !explicit_exported {
        provider.main.exported =
            pkg.target_sdk < sdk::JELLY_BEAN_MR1 || !provider.intents.is_empty();
    }

    Ok(provider)
}

/// `<grant-uri-permission>`: pattern beats prefix beats literal path
fn parse_grant_uri_permission(
    provider: &mut Provider,
    attrs: &TagAttributes,
    pkg: &ParsedPackage,
    position: String,
    ctx: &ParseContext,
) -> ParseResult<()> {
    let candidates = [
        ("pathPattern", PatternKind::SimpleGlob),
        ("pathPrefix", PatternKind::Prefix),
        ("path", PatternKind::Literal),
    ];
    let pattern = first_pattern(attrs, &candidates)?;

    match pattern {
        Some(pattern) => {
            provider.uri_permission_patterns.push(pattern);
            provider.grant_uri_permissions = true;
        }
        None => {
            let message = "No path, pathPrefix, or pathPattern for <grant-uri-permission>";
            if ctx.options.strict {
                return Err(ParseError::invalid(message));
            }
            warn!("{} at {} in package {}", message, position, pkg.package_name);
        }
    }
    Ok(())
}

/// `<path-permission>`: advanced glob beats glob beats prefix beats literal
fn parse_path_permission(
    provider: &mut Provider,
    attrs: &TagAttributes,
    pkg: &ParsedPackage,
    position: String,
    ctx: &ParseContext,
) -> ParseResult<()> {
    let permission = attrs.get_string("permission");
    let read_permission = attrs.get_string("readPermission").or_else(|| permission.clone());
    let write_permission = attrs.get_string("writePermission").or(permission);

    if read_permission.is_none() && write_permission.is_none() {
        let message = "No readPermission or writePermission for <path-permission>";
        if ctx.options.strict {
            return Err(ParseError::invalid(message));
        }
        warn!("{} at {} in package {}", message, position, pkg.package_name);
        return Ok(());
    }

    let candidates = [
        ("pathAdvancedPattern", PatternKind::AdvancedGlob),
        ("pathPattern", PatternKind::SimpleGlob),
        ("pathPrefix", PatternKind::Prefix),
        ("path", PatternKind::Literal),
    ];
    match first_pattern(attrs, &candidates)? {
        Some(pattern) => provider.path_permissions.push(PathPermission {
            pattern,
            read_permission,
            write_permission,
        }),
        None => {
            let message = "No path, pathPrefix, or pathPattern for <path-permission>";
            if ctx.options.strict {
                return Err(ParseError::invalid(message));
            }
            warn!("{} at {} in package {}", message, position, pkg.package_name);
        }
    }
    Ok(())
}

/// First declared attribute in priority order, as a matcher
fn first_pattern(
    attrs: &TagAttributes,
    candidates: &[(&str, PatternKind)],
) -> ParseResult<Option<PatternMatcher>> {
    for (attribute, kind) in candidates {
        if let Some(path) = attrs.get_string(attribute) {
            return PatternMatcher::new(path, *kind)
                .map(Some)
                .map_err(ParseError::Invalid);
        }
    }
    Ok(None)
}
