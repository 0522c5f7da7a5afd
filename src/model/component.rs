use super::intent::IntentFilter;
use super::metadata::MetaData;
use serde::Serialize;
use std::ops::{Deref, DerefMut};

/// Resource id of a referenced resource. Zero means unset.
pub type ResId = u32;

/// Fields shared by every declared manifest element
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Component {
    /// Fully-qualified class (or permission) name, resolved against `package_name`
    pub name: String,

    pub package_name: String,

    pub icon: ResId,
    pub logo: ResId,
    pub banner: ResId,

    /// Label resource; when zero the label may be a literal `non_localized_label`
    pub label_res: ResId,
    pub non_localized_label: Option<String>,

    pub description_res: ResId,

    /// Intent filters in document order
    pub intents: Vec<IntentFilter>,

    pub meta_data: MetaData,
}

impl Component {
    /// Last segment of the class name
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// A component that runs inside an application process
/// (activities, receivers, services and providers)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainComponent {
    #[serde(flatten)]
    pub component: Component,

    pub process_name: Option<String>,
    pub direct_boot_aware: bool,
    pub enabled: bool,
    pub exported: bool,

    /// Highest `order` among the attached intent filters
    pub order: i32,

    pub split_name: Option<String>,
}

impl Default for MainComponent {
    fn default() -> Self {
        Self {
            component: Component::default(),
            process_name: None,
            direct_boot_aware: false,
            enabled: true,
            exported: false,
            order: 0,
            split_name: None,
        }
    }
}

impl MainComponent {
    /// Attach an intent filter, keeping `order` at the running maximum
    pub fn add_intent(&mut self, intent: IntentFilter) {
        self.order = self.order.max(intent.order);
        self.component.intents.push(intent);
    }
}

impl Deref for MainComponent {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.component
    }
}

impl DerefMut for MainComponent {
    fn deref_mut(&mut self) -> &mut Component {
        &mut self.component
    }
}
