use super::schema;
use crate::model::ResId;
use std::collections::BTreeMap;

/// An attribute value as written in the manifest, after reference resolution
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Literal(String),
    Reference {
        id: ResId,
        name: String,
        /// String value of the referenced resource, when known
        resolved: Option<String>,
    },
    Null,
}

/// Coarse type of an attribute value, mirroring `TypedValue` types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Reference,
    Boolean,
    Int,
    Float,
    Dimension,
    Fraction,
    Null,
}

/// A raw `namespace:local="value"` attribute of the current tag
#[derive(Debug, Clone, PartialEq)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub local: String,
    pub value: String,
}

/// Attributes of one start tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagAttributes {
    android: BTreeMap<String, RawValue>,
    raw: Vec<XmlAttribute>,
}

impl TagAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_raw(&mut self, attribute: XmlAttribute) {
        self.raw.push(attribute);
    }

    /// Record an Android-namespace attribute
    pub fn insert(&mut self, local: impl Into<String>, value: RawValue) {
        self.android.insert(local.into(), value);
    }

    pub fn raw_value(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.raw
            .iter()
            .find(|a| a.namespace.as_deref() == namespace && a.local == local)
            .map(|a| a.value.as_str())
    }
}

/// Typed access to the Android-namespace attributes of a tag.
///
/// Keys are attribute local names (`name`, `exported`, `launchMode`).
/// Getters fall back to the supplied default when the attribute is absent or
/// its text does not fit the requested type.
pub trait AttributeSet {
    fn raw(&self, name: &str) -> Option<&RawValue>;

    fn has_value(&self, name: &str) -> bool {
        !matches!(self.raw(name), None | Some(RawValue::Null))
    }

    /// The resource id or literal text, `None` when absent or `@null`
    fn peek_value(&self, name: &str) -> Option<&RawValue> {
        self.raw(name).filter(|v| !matches!(v, RawValue::Null))
    }

    /// Literal text, or the string a reference resolves to
    fn get_string(&self, name: &str) -> Option<String> {
        match self.raw(name)? {
            RawValue::Literal(text) => Some(text.clone()),
            RawValue::Reference { resolved, .. } => resolved.clone(),
            RawValue::Null => None,
        }
    }

    /// Literal text only; references yield `None`
    fn get_non_resource_string(&self, name: &str) -> Option<String> {
        match self.raw(name)? {
            RawValue::Literal(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn get_int(&self, name: &str, default: i32) -> i32 {
        match self.raw(name) {
            Some(RawValue::Literal(text)) => parse_int(name, text).unwrap_or(default),
            _ => default,
        }
    }

    fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.raw(name) {
            Some(RawValue::Literal(text)) => match text.trim() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }

    fn get_resource_id(&self, name: &str, default: ResId) -> ResId {
        match self.raw(name) {
            Some(RawValue::Reference { id, .. }) => *id,
            _ => default,
        }
    }

    fn get_float(&self, name: &str, default: f32) -> f32 {
        match self.raw(name) {
            Some(RawValue::Literal(text)) => text.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    fn value_type(&self, name: &str) -> ValueType {
        match self.raw(name) {
            None | Some(RawValue::Null) => ValueType::Null,
            Some(RawValue::Reference { .. }) => ValueType::Reference,
            Some(RawValue::Literal(text)) => classify(name, text),
        }
    }

    /// Dimension in pixels at baseline density; `dp`, `dip` and `sp` are 1:1
    fn get_dimension_pixel_size(&self, name: &str, default: i32) -> i32 {
        match self.raw(name) {
            Some(RawValue::Literal(text)) => parse_dimension(text)
                .map(|px| px.round() as i32)
                .unwrap_or(default),
            _ => default,
        }
    }

    /// `n%` is relative to `base`, `n%p` to `parent_base`
    fn get_fraction(&self, name: &str, base: f32, parent_base: f32, default: f32) -> f32 {
        match self.raw(name) {
            Some(RawValue::Literal(text)) => parse_fraction(text, base, parent_base).unwrap_or(default),
            _ => default,
        }
    }
}

impl AttributeSet for TagAttributes {
    fn raw(&self, name: &str) -> Option<&RawValue> {
        self.android.get(name)
    }
}

fn parse_int(name: &str, text: &str) -> Option<i32> {
    schema::parse_int_literal(text).or_else(|| schema::lookup(name, text))
}

const DIMENSION_UNITS: &[(&str, f32)] = &[
    ("px", 1.0),
    ("dip", 1.0),
    ("dp", 1.0),
    ("sp", 1.0),
    ("pt", 160.0 / 72.0),
    ("in", 160.0),
    ("mm", 160.0 / 25.4),
];

fn parse_dimension(text: &str) -> Option<f32> {
    let text = text.trim();
    DIMENSION_UNITS.iter().find_map(|(unit, scale)| {
        let number = text.strip_suffix(unit)?;
        number.trim().parse::<f32>().ok().map(|n| n * scale)
    })
}

fn parse_fraction(text: &str, base: f32, parent_base: f32) -> Option<f32> {
    let text = text.trim();
    if let Some(number) = text.strip_suffix("%p") {
        return number.trim().parse::<f32>().ok().map(|n| n / 100.0 * parent_base);
    }
    let number = text.strip_suffix('%')?;
    number.trim().parse::<f32>().ok().map(|n| n / 100.0 * base)
}

fn classify(name: &str, text: &str) -> ValueType {
    let trimmed = text.trim();
    if trimmed == "true" || trimmed == "false" {
        ValueType::Boolean
    } else if schema::parse_int_literal(trimmed).is_some() {
        ValueType::Int
    } else if trimmed.parse::<f32>().is_ok() {
        ValueType::Float
    } else if parse_dimension(trimmed).is_some() {
        ValueType::Dimension
    } else if parse_fraction(trimmed, 1.0, 1.0).is_some() {
        ValueType::Fraction
    } else if schema::lookup(name, trimmed).is_some() {
        ValueType::Int
    } else {
        ValueType::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> TagAttributes {
        let mut attrs = TagAttributes::new();
        for (name, value) in pairs {
            attrs.insert(*name, RawValue::Literal(value.to_string()));
        }
        attrs
    }

    #[test]
    fn test_getters_with_defaults() {
        let attrs = attrs(&[
            ("exported", "true"),
            ("priority", "10"),
            ("launchMode", "singleInstance"),
            ("maxAspectRatio", "2.4"),
        ]);
        assert!(attrs.get_bool("exported", false));
        assert!(attrs.get_bool("enabled", true));
        assert_eq!(attrs.get_int("priority", 0), 10);
        assert_eq!(attrs.get_int("launchMode", 0), 3);
        assert_eq!(attrs.get_int("missing", 7), 7);
        assert!((attrs.get_float("maxAspectRatio", 0.0) - 2.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_references_and_strings() {
        let mut attrs = TagAttributes::new();
        attrs.insert(
            "label",
            RawValue::Reference {
                id: 0x7f01_0000,
                name: "@string/app_name".to_string(),
                resolved: Some("Example".to_string()),
            },
        );
        attrs.insert("process", RawValue::Literal(":remote".to_string()));
        attrs.insert("icon", RawValue::Null);

        assert_eq!(attrs.get_string("label").as_deref(), Some("Example"));
        assert_eq!(attrs.get_non_resource_string("label"), None);
        assert_eq!(attrs.get_resource_id("label", 0), 0x7f01_0000);
        assert_eq!(attrs.get_non_resource_string("process").as_deref(), Some(":remote"));
        assert!(!attrs.has_value("icon"));
        assert!(attrs.peek_value("icon").is_none());
        assert_eq!(attrs.value_type("label"), ValueType::Reference);
    }

    #[test]
    fn test_value_types() {
        let attrs = attrs(&[
            ("a", "1.86"),
            ("b", "2"),
            ("c", "true"),
            ("d", "320dp"),
            ("e", "50%"),
            ("f", "hello"),
            ("screenOrientation", "portrait"),
        ]);
        assert_eq!(attrs.value_type("a"), ValueType::Float);
        assert_eq!(attrs.value_type("b"), ValueType::Int);
        assert_eq!(attrs.value_type("c"), ValueType::Boolean);
        assert_eq!(attrs.value_type("d"), ValueType::Dimension);
        assert_eq!(attrs.value_type("e"), ValueType::Fraction);
        assert_eq!(attrs.value_type("f"), ValueType::String);
        assert_eq!(attrs.value_type("screenOrientation"), ValueType::Int);
        assert_eq!(attrs.value_type("missing"), ValueType::Null);
    }

    #[test]
    fn test_dimensions_and_fractions() {
        let attrs = attrs(&[("defaultWidth", "500dp"), ("defaultHeight", "60%"), ("minWidth", "1in")]);
        assert_eq!(attrs.get_dimension_pixel_size("defaultWidth", -1), 500);
        assert_eq!(attrs.get_dimension_pixel_size("minWidth", -1), 160);
        assert_eq!(attrs.get_dimension_pixel_size("defaultHeight", -1), -1);
        assert!((attrs.get_fraction("defaultHeight", 1.0, 1.0, -1.0) - 0.6).abs() < 1e-6);
    }
}
