use serde::Serialize;
use std::collections::BTreeSet;

pub const PERMISSION_INTERNET: &str = "android.permission.INTERNET";

/// A `<process>` entry from the application's `<processes>` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Process {
    pub name: String,
    pub denied_permissions: BTreeSet<String>,
    pub gwp_asan_mode: i32,
    pub memtag_mode: i32,
    /// -1 unknown, 0 disabled, 1 enabled
    pub native_heap_zero_initialized: i32,
}

impl Process {
    pub fn new(name: impl Into<String>, denied_permissions: BTreeSet<String>) -> Self {
        Self {
            name: name.into(),
            denied_permissions,
            gwp_asan_mode: -1,
            memtag_mode: -1,
            native_heap_zero_initialized: -1,
        }
    }

    pub fn denies(&self, permission: &str) -> bool {
        self.denied_permissions.contains(permission)
    }
}
