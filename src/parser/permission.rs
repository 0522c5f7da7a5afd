use super::component::{parse_all_meta_data, parse_component};
use super::result::{ParseError, ParseResult};
use super::xml::{AttributeSet, TagCursor};
use super::ParseContext;
use crate::model::permission::{permission_flags, protection};
use crate::model::{ParsedPackage, Permission, PermissionGroup};
use tracing::warn;

const PLATFORM_PACKAGE: &str = "android";

/// Protection flags any base level may carry
const UNIVERSAL_PROTECTION_FLAGS: u32 =
    protection::FLAG_APPOP | protection::FLAG_INSTANT | protection::FLAG_RUNTIME_ONLY;

/// Parse the `<permission>` under the cursor, meta-data children included
pub fn parse_permission<C: TagCursor + ?Sized>(
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Permission> {
    let attrs = cursor.attributes().clone();
    let mut permission = Permission::default();

    parse_component(&mut permission.component, "<permission>", pkg, &attrs, ctx, true)?;

    if let Some(background) = attrs.get_string("backgroundPermission") {
        if pkg.package_name == PLATFORM_PACKAGE {
            permission.background_permission = Some(background);
        } else {
            warn!(
                "{} defines a background permission. Only the 'android' package can do that.",
                pkg.package_name
            );
        }
    }

    // Groups are plain strings, never resources
    permission.group = attrs.get_non_resource_string("permissionGroup");
    permission.request_res = attrs.get_resource_id("request", 0);
    permission.protection_level = attrs.get_int("protectionLevel", protection::NORMAL as i32) as u32;
    permission.flags = attrs.get_int("permissionFlags", 0) as u32;

    let restricted = permission_flags::SOFT_RESTRICTED | permission_flags::HARD_RESTRICTED;
    if !permission.is_runtime() || pkg.package_name != PLATFORM_PACKAGE {
        permission.flags &= !restricted;
    } else if permission.flags & restricted == restricted {
        return Err(ParseError::Internal(format!(
            "Permission cannot be both soft and hard restricted: {}",
            permission.name
        )));
    }

    permission.protection_level = protection::fix(permission.protection_level);

    let base = permission.protection();
    if permission.protection_flags() & !UNIVERSAL_PROTECTION_FLAGS != 0
        && base != protection::SIGNATURE
        && base != protection::INTERNAL
    {
        return Err(ParseError::invalid(
            "<permission> protectionLevel specifies a non-instant, non-appop, non-runtimeOnly flag but is not based on signature or internal type",
        ));
    }

    parse_all_meta_data(&mut permission.component, "<permission>", pkg, cursor, ctx)?;
    Ok(permission)
}

/// Parse the `<permission-tree>` under the cursor
pub fn parse_permission_tree<C: TagCursor + ?Sized>(
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Permission> {
    let attrs = cursor.attributes().clone();
    let mut permission = Permission::default();

    parse_component(&mut permission.component, "<permission-tree>", pkg, &attrs, ctx, false)?;

    if !has_three_segments(&permission.name) {
        return Err(ParseError::invalid(format!(
            "<permission-tree> name has less than three segments: {}",
            permission.name
        )));
    }

    permission.protection_level = protection::NORMAL;
    permission.tree = true;

    parse_all_meta_data(&mut permission.component, "<permission-tree>", pkg, cursor, ctx)?;
    Ok(permission)
}

/// First dot past the start, then a second one
fn has_three_segments(name: &str) -> bool {
    match name.find('.') {
        Some(first) if first > 0 => name[first + 1..].contains('.'),
        _ => false,
    }
}

/// Parse the `<permission-group>` under the cursor
pub fn parse_permission_group<C: TagCursor + ?Sized>(
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<PermissionGroup> {
    let attrs = cursor.attributes().clone();
    let mut group = PermissionGroup::default();

    parse_component(&mut group.component, "<permission-group>", pkg, &attrs, ctx, true)?;

    group.request_detail_res = attrs.get_resource_id("requestDetail", 0);
    group.background_request_res = attrs.get_resource_id("backgroundRequest", 0);
    group.background_request_detail_res = attrs.get_resource_id("backgroundRequestDetail", 0);
    group.request_res = attrs.get_resource_id("request", 0);
    group.flags = attrs.get_int("permissionGroupFlags", 0);
    group.priority = attrs.get_int("priority", 0);

    parse_all_meta_data(&mut group.component, "<permission-group>", pkg, cursor, ctx)?;
    Ok(group)
}
