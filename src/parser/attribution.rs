use super::result::{ParseError, ParseResult};
use super::xml::{AttributeSet, TagCursor};
use crate::model::attribution::MAX_ATTRIBUTION_TAG_LEN;
use crate::model::Attribution;
use tracing::debug;

/// Parse the `<attribution>` under the cursor along with its `<inherit-from>` children
pub fn parse_attribution<C: TagCursor + ?Sized>(cursor: &mut C) -> ParseResult<Attribution> {
    let attrs = cursor.attributes().clone();

    let tag = attrs
        .get_string("tag")
        .ok_or_else(|| ParseError::invalid("<attribution> does not specify android:tag"))?;
    if tag.chars().count() > MAX_ATTRIBUTION_TAG_LEN {
        return Err(ParseError::invalid(format!(
            "android:tag is longer than {} characters",
            MAX_ATTRIBUTION_TAG_LEN
        )));
    }

    let label = attrs.get_resource_id("label", 0);
    if label == 0 {
        return Err(ParseError::invalid("<attribution> does not specify android:label"));
    }

    let mut inherit_from = Vec::new();
    let depth = cursor.depth();
    while let Some(child) = cursor.next_child(depth)? {
        if child != "inherit-from" {
            return Err(ParseError::invalid(format!(
                "Bad element under <attribution>: {}",
                child
            )));
        }

        match cursor.attributes().get_string("tag") {
            Some(inherited) => inherit_from.push(inherited),
            None => debug!("<inherit-from> without android:tag at {}", cursor.position()),
        }
        cursor.skip_current_tag()?;
    }

    Ok(Attribution {
        tag,
        label,
        inherit_from,
    })
}
