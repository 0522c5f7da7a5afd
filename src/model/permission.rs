use super::component::{Component, ResId};
use serde::Serialize;
use std::ops::{Deref, DerefMut};

/// `PermissionInfo` protection levels: a base level in the low nibble plus flags
pub mod protection {
    pub const NORMAL: u32 = 0;
    pub const DANGEROUS: u32 = 1;
    pub const SIGNATURE: u32 = 2;
    /// Deprecated; rewritten to `SIGNATURE | FLAG_PRIVILEGED`
    pub const SIGNATURE_OR_SYSTEM: u32 = 3;
    pub const INTERNAL: u32 = 4;

    pub const MASK_BASE: u32 = 0xf;

    pub const FLAG_PRIVILEGED: u32 = 0x10;
    pub const FLAG_DEVELOPMENT: u32 = 0x20;
    pub const FLAG_APPOP: u32 = 0x40;
    pub const FLAG_PRE23: u32 = 0x80;
    pub const FLAG_INSTALLER: u32 = 0x100;
    pub const FLAG_VERIFIER: u32 = 0x200;
    pub const FLAG_PREINSTALLED: u32 = 0x400;
    pub const FLAG_SETUP: u32 = 0x800;
    pub const FLAG_INSTANT: u32 = 0x1000;
    pub const FLAG_RUNTIME_ONLY: u32 = 0x2000;
    pub const FLAG_OEM: u32 = 0x4000;
    pub const FLAG_VENDOR_PRIVILEGED: u32 = 0x8000;

    /// Normalize a parsed protection level
    pub fn fix(level: u32) -> u32 {
        let mut level = level;
        if level == SIGNATURE_OR_SYSTEM {
            level = SIGNATURE | FLAG_PRIVILEGED;
        }
        if level & FLAG_VENDOR_PRIVILEGED != 0 && level & FLAG_PRIVILEGED == 0 {
            level &= !FLAG_VENDOR_PRIVILEGED;
        }
        level
    }

    pub fn name(base: u32) -> &'static str {
        match base {
            NORMAL => "normal",
            DANGEROUS => "dangerous",
            SIGNATURE => "signature",
            SIGNATURE_OR_SYSTEM => "signatureOrSystem",
            INTERNAL => "internal",
            _ => "unknown",
        }
    }
}

/// `PermissionInfo.flags` bits
pub mod permission_flags {
    pub const COSTS_MONEY: u32 = 0x1;
    pub const REMOVED: u32 = 0x2;
    pub const HARD_RESTRICTED: u32 = 0x4;
    pub const SOFT_RESTRICTED: u32 = 0x8;
    pub const IMMUTABLY_RESTRICTED: u32 = 0x10;
}

/// A `<permission>` or `<permission-tree>` declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Permission {
    #[serde(flatten)]
    pub component: Component,

    pub background_permission: Option<String>,
    pub group: Option<String>,
    pub request_res: ResId,
    pub protection_level: u32,
    pub flags: u32,
    /// Root of a `<permission-tree>`
    pub tree: bool,
}

impl Permission {
    pub fn protection(&self) -> u32 {
        self.protection_level & protection::MASK_BASE
    }

    pub fn protection_flags(&self) -> u32 {
        self.protection_level & !protection::MASK_BASE
    }

    pub fn is_runtime(&self) -> bool {
        self.protection() == protection::DANGEROUS
    }
}

impl Deref for Permission {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.component
    }
}

impl DerefMut for Permission {
    fn deref_mut(&mut self) -> &mut Component {
        &mut self.component
    }
}

/// A `<permission-group>` declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PermissionGroup {
    #[serde(flatten)]
    pub component: Component,

    pub request_detail_res: ResId,
    pub background_request_res: ResId,
    pub background_request_detail_res: ResId,
    pub request_res: ResId,
    pub flags: i32,
    pub priority: i32,
}

impl Deref for PermissionGroup {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.component
    }
}

impl DerefMut for PermissionGroup {
    fn deref_mut(&mut self) -> &mut Component {
        &mut self.component
    }
}
