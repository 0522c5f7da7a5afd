use super::component::{
    fold_flags, parse_main_component, parse_main_intent_filter, parse_meta_data, skip_known_tag,
    unknown_tag, FilterRules, MainAttrs,
};
use super::result::{ParseError, ParseResult};
use super::xml::{AttributeSet, TagCursor};
use super::ParseContext;
use crate::model::service::FOREGROUND_SERVICE_TYPE_NONE;
use crate::model::{ParsedPackage, Service, ServiceFlags};

const TAG: &str = "<service>";

/// Services match intents with globs but never auto-verify, are never
/// implicitly visible, and keep filters that declare no action.
const SERVICE_FILTERS: FilterRules = FilterRules {
    allow_globs: true,
    allow_auto_verify: false,
    allow_implicit_visibility: false,
    fail_on_no_actions: false,
};

/// Parse the `<service>` under the cursor
pub fn parse_service<C: TagCursor + ?Sized>(
    pkg: &mut ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Service> {
    let attrs = cursor.attributes().clone();
    let mut service = Service::default();

    parse_main_component(&mut service.main, TAG, pkg, &attrs, ctx, MainAttrs::ALL)?;

    let explicit_exported = attrs.has_value("exported");
    if explicit_exported {
        service.main.exported = attrs.get_bool("exported", false);
    }

    service.permission = attrs
        .get_string("permission")
        .or_else(|| pkg.permission.clone());
    service.foreground_service_type =
        attrs.get_int("foregroundServiceType", FOREGROUND_SERVICE_TYPE_NONE);
    service.flags |= fold_flags(
        &attrs,
        &[
            (ServiceFlags::STOP_WITH_TASK, "stopWithTask", false),
            (ServiceFlags::ISOLATED_PROCESS, "isolatedProcess", false),
            (ServiceFlags::EXTERNAL_SERVICE, "externalService", false),
            (ServiceFlags::USE_APP_ZYGOTE, "useAppZygote", false),
            (ServiceFlags::SINGLE_USER, "singleUser", false),
        ],
    );

    let visible_to_instant_apps = attrs.get_bool("visibleToInstantApps", false);
    if visible_to_instant_apps {
        service.flags |= ServiceFlags::VISIBLE_TO_INSTANT_APP;
        pkg.visible_to_instant_apps = true;
    }

    if pkg.cant_save_state && service.process_name.as_deref() == Some(pkg.package_name.as_str()) {
        return Err(ParseError::invalid(
            "Heavy-weight applications can not have services in main process",
        ));
    }

    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        match child.as_str() {
            "intent-filter" => {
                let filter = parse_main_intent_filter(
                    &service.name,
                    pkg,
                    cursor,
                    ctx,
                    SERVICE_FILTERS,
                    visible_to_instant_apps,
                )?;
                if let Some(filter) = filter {
                    service.main.add_intent(filter);
                }
            }
            "meta-data" => parse_meta_data(&mut service.main.component.meta_data, pkg, cursor, ctx)?,
            "property" => skip_known_tag(cursor)?,
            _ => unknown_tag(TAG, pkg, cursor, ctx)?,
        }
    }

    if !explicit_exported {
        service.main.exported = !service.intents.is_empty();
    }

    Ok(service)
}
