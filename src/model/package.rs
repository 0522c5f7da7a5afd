use super::activity::Activity;
use super::attribution::Attribution;
use super::component::MainComponent;
use super::instrumentation::Instrumentation;
use super::intent::IntentFilter;
use super::metadata::MetaData;
use super::permission::{Permission, PermissionGroup};
use super::process::Process;
use super::provider::Provider;
use super::service::Service;
use serde::Serialize;
use std::collections::BTreeMap;

pub mod sdk {
    pub const FROYO: u32 = 8;
    pub const ICE_CREAM_SANDWICH: u32 = 14;
    pub const JELLY_BEAN_MR1: u32 = 17;
    pub const N: u32 = 24;
    pub const Q: u32 = 29;
    pub const CUR_DEVELOPMENT: u32 = 10_000;
}

/// `<preferred>` filter registered by an activity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferredActivityFilter {
    pub activity: String,
    pub filter: IntentFilter,
}

/// The package being parsed.
///
/// Builders read the application-level defaults from it and write the
/// package-wide aggregates (`visible_to_instant_apps`,
/// `partially_direct_boot_aware`, preferred filters) back into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPackage {
    pub package_name: String,
    pub min_sdk: u32,
    pub target_sdk: u32,

    // Application-level defaults
    pub process_name: Option<String>,
    pub task_affinity: Option<String>,
    pub permission: Option<String>,
    pub class_name: Option<String>,
    pub cant_save_state: bool,
    pub resizeable_activity: Option<bool>,
    pub resizeable_activity_via_sdk_version: bool,
    pub base_hardware_accelerated: bool,
    pub ui_options: i32,
    pub allow_task_reparenting: bool,
    pub direct_boot_aware: bool,

    // Written by component builders
    pub visible_to_instant_apps: bool,
    pub partially_direct_boot_aware: bool,
    pub preferred_activity_filters: Vec<PreferredActivityFilter>,

    pub activities: Vec<Activity>,
    pub receivers: Vec<Activity>,
    pub services: Vec<Service>,
    pub providers: Vec<Provider>,
    pub permissions: Vec<Permission>,
    pub permission_groups: Vec<PermissionGroup>,
    pub instrumentations: Vec<Instrumentation>,
    pub attributions: Vec<Attribution>,
    pub processes: BTreeMap<String, Process>,
    pub meta_data: MetaData,
}

impl ParsedPackage {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            min_sdk: 1,
            target_sdk: 1,
            process_name: None,
            task_affinity: None,
            permission: None,
            class_name: None,
            cant_save_state: false,
            resizeable_activity: None,
            resizeable_activity_via_sdk_version: false,
            base_hardware_accelerated: false,
            ui_options: 0,
            allow_task_reparenting: false,
            direct_boot_aware: false,
            visible_to_instant_apps: false,
            partially_direct_boot_aware: false,
            preferred_activity_filters: Vec::new(),
            activities: Vec::new(),
            receivers: Vec::new(),
            services: Vec::new(),
            providers: Vec::new(),
            permissions: Vec::new(),
            permission_groups: Vec::new(),
            instrumentations: Vec::new(),
            attributions: Vec::new(),
            processes: BTreeMap::new(),
            meta_data: MetaData::new(),
        }
    }

    /// Application process, defaulting to the package name
    pub fn process_name(&self) -> &str {
        self.process_name.as_deref().unwrap_or(&self.package_name)
    }

    pub fn add_preferred_activity_filter(&mut self, activity: &str, filter: IntentFilter) {
        self.preferred_activity_filters.push(PreferredActivityFilter {
            activity: activity.to_string(),
            filter,
        });
    }

    pub fn find_activity(&self, name: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.name == name)
    }

    /// Every component that runs in a process, labelled by kind
    pub fn main_components(&self) -> impl Iterator<Item = (&'static str, &MainComponent)> {
        let activities = self.activities.iter().map(|a| ("activity", &a.main));
        let services = self.services.iter().map(|s| ("service", &s.main));
        let receivers = self.receivers.iter().map(|r| ("receiver", &r.main));
        let providers = self.providers.iter().map(|p| ("provider", &p.main));
        activities.chain(services).chain(receivers).chain(providers)
    }

    pub fn component_count(&self) -> usize {
        self.activities.len()
            + self.receivers.len()
            + self.services.len()
            + self.providers.len()
            + self.permissions.len()
            + self.permission_groups.len()
            + self.instrumentations.len()
    }

    /// When `<processes>` is declared, every process a component runs in must be listed
    pub fn assert_processes_are_valid(&self) -> Result<(), String> {
        if self.processes.is_empty() {
            return Ok(());
        }

        if !self.processes.contains_key(self.process_name()) {
            return Err(format!(
                "Can't install because application tag's process attribute {} (in package {}) is not included in the <processes> list",
                self.process_name(),
                self.package_name
            ));
        }

        for (kind, component) in self.main_components() {
            let process = component.process_name.as_deref().unwrap_or(self.process_name());
            if !self.processes.contains_key(process) {
                return Err(format!(
                    "Can't install because {} {}'s process attribute {} (in package {}) is not included in the <processes> list",
                    kind, component.name, process, self.package_name
                ));
            }
        }

        Ok(())
    }

    /// Stable sort by descending `order` for lists where any component declared one
    pub fn sort_components_by_order(&mut self) {
        fn sort(list: &mut [Activity]) {
            if list.iter().any(|a| a.order != 0) {
                list.sort_by(|a, b| b.order.cmp(&a.order));
            }
        }
        sort(&mut self.activities);
        sort(&mut self.receivers);
        if self.services.iter().any(|s| s.order != 0) {
            self.services.sort_by(|a, b| b.order.cmp(&a.order));
        }
    }
}
