use super::component::{parse_all_meta_data, parse_component};
use super::result::ParseResult;
use super::xml::{AttributeSet, TagCursor};
use super::ParseContext;
use crate::model::{Instrumentation, ParsedPackage};

const TAG: &str = "<instrumentation>";

/// Parse the `<instrumentation>` under the cursor
pub fn parse_instrumentation<C: TagCursor + ?Sized>(
    pkg: &ParsedPackage,
    cursor: &mut C,
    ctx: &mut ParseContext,
) -> ParseResult<Instrumentation> {
    let attrs = cursor.attributes().clone();
    let mut instrumentation = Instrumentation::default();

    parse_component(&mut instrumentation.component, TAG, pkg, &attrs, ctx, false)?;

    instrumentation.target_package = attrs.get_non_resource_string("targetPackage");
    instrumentation.target_processes = attrs.get_non_resource_string("targetProcesses");
    instrumentation.handle_profiling = attrs.get_bool("handleProfiling", false);
    instrumentation.functional_test = attrs.get_bool("functionalTest", false);

    parse_all_meta_data(&mut instrumentation.component, TAG, pkg, cursor, ctx)?;
    Ok(instrumentation)
}
