use super::component::ResId;
use serde::Serialize;
use std::collections::BTreeMap;

/// A typed `<meta-data>` value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetaValue {
    String(String),
    Int(i32),
    Bool(bool),
    Float(f32),
    Resource(ResId),
}

/// String-keyed `<meta-data>` bundle attached to a component or application
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetaData {
    entries: BTreeMap<String, MetaValue>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later declarations of the same key replace earlier ones
    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(MetaValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(MetaValue::Bool(value)) => *value,
            _ => default,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.entries.iter()
    }
}
