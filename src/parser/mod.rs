//! Android manifest parsing.
//!
//! The component builders ([`activity`], [`service`], [`provider`], ...) all
//! work against the [`xml::TagCursor`] / [`xml::AttributeSet`] pair and write
//! package-wide state into a [`ParsedPackage`](crate::model::ParsedPackage).
//! [`ManifestParser`] drives them over a whole document.

pub mod activity;
pub mod attribution;
pub mod component;
pub mod instrumentation;
pub mod intent;
mod manifest;
pub mod names;
mod options;
pub mod permission;
pub mod process;
pub mod provider;
mod result;
pub mod service;
pub mod xml;

pub use manifest::{ManifestParser, ParsedManifest};
pub use options::{ParseFlags, ParseOptions};
pub use result::{DeferredError, DeferredErrorKind, ParseError, ParseInput, ParseResult};

/// State threaded through every builder during one manifest parse
#[derive(Debug)]
pub struct ParseContext {
    pub options: ParseOptions,
    pub input: ParseInput,
}

impl ParseContext {
    pub fn new(options: ParseOptions) -> Self {
        let input = if options.tolerate_deferred_errors {
            ParseInput::tolerant()
        } else {
            ParseInput::new()
        };
        Self { options, input }
    }
}
