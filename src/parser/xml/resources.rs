use crate::model::ResId;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

const ANDROID_PACKAGE_ID: u32 = 0x01;
const APP_PACKAGE_ID: u32 = 0x7f;

/// A parsed `@[+][package:]type/name` or `?[package:]type/name` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef<'a> {
    pub package: Option<&'a str>,
    pub kind: &'a str,
    pub name: &'a str,
}

impl<'a> ResourceRef<'a> {
    pub fn parse(text: &'a str) -> Option<Self> {
        let body = text
            .strip_prefix("@+")
            .or_else(|| text.strip_prefix('@'))
            .or_else(|| text.strip_prefix('?'))?;
        let (package, rest) = match body.split_once(':') {
            Some((package, rest)) => (Some(package), rest),
            None => (None, body),
        };
        let (kind, name) = match rest.split_once('/') {
            Some(pair) => pair,
            // `?attrName` form
            None if text.starts_with('?') => ("attr", rest),
            None => return None,
        };
        if kind.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self { package, kind, name })
    }

    fn is_framework(&self) -> bool {
        self.package == Some("android")
    }

    /// Canonical `@[android:]type/name` spelling
    pub fn canonical(&self) -> String {
        if self.is_framework() {
            format!("@android:{}/{}", self.kind, self.name)
        } else {
            format!("@{}/{}", self.kind, self.name)
        }
    }
}

/// What an attribute's text resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// `@null`
    Null,
    /// A reference with its synthetic id and, for strings, the configured value
    Reference {
        id: ResId,
        name: String,
        value: Option<String>,
    },
}

/// Synthetic resource table for text manifests.
///
/// Every distinct reference gets a stable id laid out like a real one:
/// `package << 24 | type << 16 | entry`, with package `0x01` for
/// `@android:` references and `0x7f` for the app. `@string/` references
/// resolve through the configured string values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceTable {
    #[serde(skip)]
    strings: BTreeMap<String, String>,
    #[serde(rename = "resources")]
    names: BTreeMap<ResId, String>,
    #[serde(skip)]
    ids: HashMap<String, ResId>,
    #[serde(skip)]
    type_ids: HashMap<(u32, String), u32>,
    #[serde(skip)]
    entry_counts: HashMap<(u32, u32), u32>,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strings(strings: BTreeMap<String, String>) -> Self {
        Self {
            strings,
            ..Self::default()
        }
    }

    /// Resolve attribute text that starts with `@` or `?`.
    ///
    /// Returns `None` for text that is not a reference after all.
    pub fn resolve(&mut self, text: &str) -> Option<Resolved> {
        if text == "@null" || text == "@empty" {
            return Some(Resolved::Null);
        }

        if let Some(hex) = text.strip_prefix("@0x") {
            let id = u32::from_str_radix(hex, 16).ok()?;
            let name = self.names.get(&id).cloned().unwrap_or_else(|| text.to_string());
            return Some(Resolved::Reference {
                id,
                name,
                value: None,
            });
        }

        let reference = ResourceRef::parse(text)?;
        let id = self.id_for(&reference);
        let value = if reference.kind == "string" && !reference.is_framework() {
            self.strings.get(reference.name).cloned()
        } else {
            None
        };

        Some(Resolved::Reference {
            id,
            name: reference.canonical(),
            value,
        })
    }

    fn id_for(&mut self, reference: &ResourceRef<'_>) -> ResId {
        let canonical = reference.canonical();
        if let Some(id) = self.ids.get(&canonical) {
            return *id;
        }

        let package = if reference.is_framework() {
            ANDROID_PACKAGE_ID
        } else {
            APP_PACKAGE_ID
        };
        let next_type = self
            .type_ids
            .keys()
            .filter(|(p, _)| *p == package)
            .count() as u32
            + 1;
        let type_id = *self
            .type_ids
            .entry((package, reference.kind.to_string()))
            .or_insert(next_type);
        let entry = self.entry_counts.entry((package, type_id)).or_insert(0);
        let id = package << 24 | type_id << 16 | *entry;
        *entry += 1;

        self.ids.insert(canonical.clone(), id);
        self.names.insert(id, canonical);
        id
    }

    /// `@type/name` spelling for an id handed out by this table
    pub fn name_of(&self, id: ResId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.strings.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_id(resolved: Option<Resolved>) -> ResId {
        match resolved {
            Some(Resolved::Reference { id, .. }) => id,
            other => panic!("expected a reference, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reference() {
        let r = ResourceRef::parse("@android:style/Theme.Black").unwrap();
        assert_eq!(r.package, Some("android"));
        assert_eq!(r.kind, "style");
        assert_eq!(r.name, "Theme.Black");

        let r = ResourceRef::parse("@+id/button").unwrap();
        assert_eq!(r.kind, "id");

        assert!(ResourceRef::parse("plain text").is_none());
        assert!(ResourceRef::parse("@nothing").is_none());
    }

    #[test]
    fn test_ids_are_stable_and_packaged() {
        let mut table = ResourceTable::new();
        let icon = reference_id(table.resolve("@drawable/icon"));
        let again = reference_id(table.resolve("@drawable/icon"));
        let logo = reference_id(table.resolve("@drawable/logo"));
        let label = reference_id(table.resolve("@string/app_name"));
        let framework = reference_id(table.resolve("@android:string/ok"));

        assert_eq!(icon, again);
        assert_eq!(icon >> 24, 0x7f);
        assert_eq!(logo, icon + 1);
        assert_ne!(label >> 16, icon >> 16, "types get distinct type ids");
        assert_eq!(framework >> 24, 0x01);
        assert_eq!(table.name_of(icon), Some("@drawable/icon"));
    }

    #[test]
    fn test_string_values_and_null() {
        let mut strings = BTreeMap::new();
        strings.insert("app_name".to_string(), "Example".to_string());
        let mut table = ResourceTable::with_strings(strings);

        match table.resolve("@string/app_name") {
            Some(Resolved::Reference { value, .. }) => assert_eq!(value.as_deref(), Some("Example")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(table.resolve("@null"), Some(Resolved::Null));
        assert_eq!(reference_id(table.resolve("@0x7f020001")), 0x7f02_0001);
    }
}
