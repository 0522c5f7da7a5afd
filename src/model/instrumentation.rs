use super::component::Component;
use serde::Serialize;
use std::ops::{Deref, DerefMut};

/// An `<instrumentation>` declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Instrumentation {
    #[serde(flatten)]
    pub component: Component,

    pub target_package: Option<String>,
    pub target_processes: Option<String>,
    pub handle_profiling: bool,
    pub functional_test: bool,
}

impl Deref for Instrumentation {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.component
    }
}

impl DerefMut for Instrumentation {
    fn deref_mut(&mut self) -> &mut Component {
        &mut self.component
    }
}
