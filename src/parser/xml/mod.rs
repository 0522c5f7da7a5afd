//! Text-XML front end: tag cursor, typed attributes and the synthetic resource table

pub mod attributes;
pub mod cursor;
pub mod resources;
pub mod schema;

pub use attributes::{AttributeSet, RawValue, TagAttributes, ValueType, XmlAttribute};
pub use cursor::{TagCursor, XmlCursor, XmlEvent, ANDROID_NAMESPACE};
pub use resources::{ResourceRef, ResourceTable};
