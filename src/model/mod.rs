//! Immutable component records produced by the manifest parser

pub mod activity;
pub mod attribution;
pub mod component;
pub mod instrumentation;
pub mod intent;
pub mod metadata;
pub mod package;
pub mod pattern;
pub mod permission;
pub mod process;
pub mod provider;
pub mod service;

pub use activity::{Activity, ActivityFlags, PrivateActivityFlags, ResizeMode, WindowLayout};
pub use attribution::Attribution;
pub use component::{Component, MainComponent, ResId};
pub use instrumentation::Instrumentation;
pub use intent::{Authority, InstantAppVisibility, IntentFilter};
pub use metadata::{MetaData, MetaValue};
pub use package::{ParsedPackage, PreferredActivityFilter};
pub use pattern::{PatternKind, PatternMatcher};
pub use permission::{Permission, PermissionGroup};
pub use process::Process;
pub use provider::{PathPermission, Provider, ProviderFlags};
pub use service::{Service, ServiceFlags};
