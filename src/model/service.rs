use super::component::MainComponent;
use bitflags::bitflags;
use serde::Serialize;
use std::ops::{Deref, DerefMut};

bitflags! {
    /// `ServiceInfo.flags` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct ServiceFlags: u32 {
        const STOP_WITH_TASK = 0x0000_0001;
        const ISOLATED_PROCESS = 0x0000_0002;
        const EXTERNAL_SERVICE = 0x0000_0004;
        const USE_APP_ZYGOTE = 0x0000_0008;
        const VISIBLE_TO_INSTANT_APP = 0x0010_0000;
        const SINGLE_USER = 0x4000_0000;
    }
}

pub const FOREGROUND_SERVICE_TYPE_NONE: i32 = 0;

/// A `<service>` declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Service {
    #[serde(flatten)]
    pub main: MainComponent,

    pub permission: Option<String>,
    pub foreground_service_type: i32,
    pub flags: ServiceFlags,
}

impl Deref for Service {
    type Target = MainComponent;

    fn deref(&self) -> &MainComponent {
        &self.main
    }
}

impl DerefMut for Service {
    fn deref_mut(&mut self) -> &mut MainComponent {
        &mut self.main
    }
}
