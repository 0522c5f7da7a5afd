//! manifestkit - Strongly-typed AndroidManifest.xml parsing
//!
//! Turns a text `AndroidManifest.xml` into typed component records:
//! activities, activity aliases, receivers, services, providers,
//! permissions, instrumentation, attributions and process declarations.
//!
//! # Architecture
//!
//! 1. **XML front end** - a pull cursor over quick-xml with Android attribute
//!    typing and a synthetic resource table ([`parser::xml`])
//! 2. **Component builders** - one per manifest element ([`parser`])
//! 3. **Manifest driver** - walks the document and maintains package-wide
//!    state ([`ManifestParser`])
//! 4. **Discovery and reporting** - the `manifestkit` CLI

pub mod config;
pub mod discovery;
pub mod model;
pub mod parser;
pub mod report;

pub use config::Config;
pub use discovery::{FileFinder, ManifestFile};
pub use model::ParsedPackage;
pub use parser::{ManifestParser, ParseError, ParseOptions, ParseResult, ParsedManifest};
pub use report::{ManifestOutcome, ReportFormat, Reporter};
