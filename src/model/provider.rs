use super::component::MainComponent;
use super::pattern::PatternMatcher;
use bitflags::bitflags;
use serde::Serialize;
use std::ops::{Deref, DerefMut};

bitflags! {
    /// `ProviderInfo.flags` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct ProviderFlags: u32 {
        const VISIBLE_TO_INSTANT_APP = 0x0010_0000;
        const SINGLE_USER = 0x4000_0000;
    }
}

/// `<path-permission>`: a path matcher guarded by read/write permissions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathPermission {
    pub pattern: PatternMatcher,
    pub read_permission: Option<String>,
    pub write_permission: Option<String>,
}

/// A `<provider>` declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Provider {
    #[serde(flatten)]
    pub main: MainComponent,

    /// Semicolon-separated authority list, never empty once parsed
    pub authority: String,
    pub read_permission: Option<String>,
    pub write_permission: Option<String>,

    pub syncable: bool,
    pub grant_uri_permissions: bool,
    pub force_uri_permissions: bool,
    pub multi_process: bool,
    pub init_order: i32,
    pub flags: ProviderFlags,

    /// Append-only; grows with each `<grant-uri-permission>`
    pub uri_permission_patterns: Vec<PatternMatcher>,
    /// Append-only; grows with each `<path-permission>`
    pub path_permissions: Vec<PathPermission>,
}

impl Provider {
    pub fn authorities(&self) -> impl Iterator<Item = &str> {
        self.authority.split(';').filter(|a| !a.is_empty())
    }
}

impl Deref for Provider {
    type Target = MainComponent;

    fn deref(&self) -> &MainComponent {
        &self.main
    }
}

impl DerefMut for Provider {
    fn deref_mut(&mut self) -> &mut MainComponent {
        &mut self.main
    }
}
