use super::component::unknown_tag;
use super::names::build_process_name;
use super::result::{ParseError, ParseResult};
use super::xml::{AttributeSet, TagCursor};
use super::ParseContext;
use crate::model::process::PERMISSION_INTERNET;
use crate::model::{ParsedPackage, Process};
use std::collections::{BTreeMap, BTreeSet};

/// Parse the `<processes>` block under the cursor.
///
/// Top-level `deny-permission`/`allow-permission` tags build the default
/// denied set that every later `<process>` starts from.
pub fn parse_processes<C: TagCursor + ?Sized>(
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<BTreeMap<String, Process>> {
    let mut denied = BTreeSet::new();
    let mut processes = BTreeMap::new();

    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        match child.as_str() {
            "deny-permission" | "allow-permission" => {
                apply_permission_rule(&child, &mut denied, cursor)?;
            }
            "process" => {
                let process = parse_process(&denied, pkg, cursor, ctx)?;
                if processes.contains_key(&process.name) {
                    return Err(ParseError::invalid(format!(
                        "<process> specified existing name '{}'",
                        process.name
                    )));
                }
                processes.insert(process.name.clone(), process);
            }
            _ => unknown_tag("<processes>", pkg, cursor, ctx)?,
        }
    }

    Ok(processes)
}

fn parse_process<C: TagCursor + ?Sized>(
    default_denied: &BTreeSet<String>,
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Process> {
    let attrs = cursor.attributes().clone();

    let name = build_process_name(
        &pkg.package_name,
        Some(&pkg.package_name),
        attrs.get_non_resource_string("process").as_deref(),
        ctx.options.flags,
        &ctx.options.separate_processes,
    )?
    .ok_or_else(|| ParseError::invalid("<process> does not specify android:process"))?;

    let mut process = Process::new(name, default_denied.clone());
    process.gwp_asan_mode = attrs.get_int("gwpAsanMode", -1);
    process.memtag_mode = attrs.get_int("memtagMode", -1);
    if attrs.has_value("nativeHeapZeroInitialized") {
        process.native_heap_zero_initialized =
            i32::from(attrs.get_bool("nativeHeapZeroInitialized", false));
    }

    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        match child.as_str() {
            "deny-permission" | "allow-permission" => {
                apply_permission_rule(&child, &mut process.denied_permissions, cursor)?;
            }
            _ => unknown_tag("<process>", pkg, cursor, ctx)?,
        }
    }

    Ok(process)
}

/// Apply one deny/allow tag in document order. Only INTERNET is tracked.
fn apply_permission_rule<C: TagCursor + ?Sized>(
    tag: &str,
    denied: &mut BTreeSet<String>,
    cursor: &mut C,
) -> ParseResult<()> {
    if let Some(permission) = cursor.attributes().get_non_resource_string("name") {
        if permission == PERMISSION_INTERNET {
            if tag == "deny-permission" {
                denied.insert(permission);
            } else {
                denied.remove(&permission);
            }
        }
    }
    cursor.skip_current_tag()
}
