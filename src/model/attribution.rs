use super::component::ResId;
use serde::Serialize;
use std::collections::HashSet;

pub const MAX_ATTRIBUTION_TAG_LEN: usize = 50;
pub const MAX_NUM_ATTRIBUTIONS: usize = 10_000;

/// An `<attribution>` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub tag: String,
    pub label: ResId,
    pub inherit_from: Vec<String>,
}

/// Tags must be unique, and every inherited tag must be unique across the
/// package and must not itself be declared.
pub fn is_combination_valid(attributions: &[Attribution]) -> bool {
    if attributions.len() > MAX_NUM_ATTRIBUTIONS {
        return false;
    }

    let mut tags = HashSet::with_capacity(attributions.len());
    for attribution in attributions {
        if !tags.insert(attribution.tag.as_str()) {
            return false;
        }
    }

    let mut inherited = HashSet::new();
    for attribution in attributions {
        for tag in &attribution.inherit_from {
            if tags.contains(tag.as_str()) || !inherited.insert(tag.as_str()) {
                return false;
            }
        }
    }

    true
}
