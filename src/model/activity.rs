use super::component::{MainComponent, ResId};
use bitflags::bitflags;
use serde::Serialize;
use std::ops::{Deref, DerefMut};

bitflags! {
    /// `ActivityInfo.flags` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct ActivityFlags: u32 {
        const MULTIPROCESS = 0x0000_0001;
        const FINISH_ON_TASK_LAUNCH = 0x0000_0002;
        const CLEAR_TASK_ON_LAUNCH = 0x0000_0004;
        const ALWAYS_RETAIN_TASK_STATE = 0x0000_0008;
        const STATE_NOT_NEEDED = 0x0000_0010;
        const EXCLUDE_FROM_RECENTS = 0x0000_0020;
        const ALLOW_TASK_REPARENTING = 0x0000_0040;
        const NO_HISTORY = 0x0000_0080;
        const FINISH_ON_CLOSE_SYSTEM_DIALOGS = 0x0000_0100;
        const HARDWARE_ACCELERATED = 0x0000_0200;
        const SHOW_FOR_ALL_USERS = 0x0000_0400;
        const IMMERSIVE = 0x0000_0800;
        const RELINQUISH_TASK_IDENTITY = 0x0000_1000;
        const AUTO_REMOVE_FROM_RECENTS = 0x0000_2000;
        const RESUME_WHILE_PAUSING = 0x0000_4000;
        const ENABLE_VR_MODE = 0x0000_8000;
        const ALWAYS_FOCUSABLE = 0x0004_0000;
        const VISIBLE_TO_INSTANT_APP = 0x0010_0000;
        const IMPLICITLY_VISIBLE_TO_INSTANT_APP = 0x0020_0000;
        const SUPPORTS_PICTURE_IN_PICTURE = 0x0040_0000;
        const SHOW_WHEN_LOCKED = 0x0080_0000;
        const TURN_SCREEN_ON = 0x0100_0000;
        const PREFER_MINIMAL_POST_PROCESSING = 0x0200_0000;
        const SYSTEM_USER_ONLY = 0x2000_0000;
        const SINGLE_USER = 0x4000_0000;
        const ALLOW_EMBEDDED = 0x8000_0000;
    }
}

bitflags! {
    /// `ActivityInfo.privateFlags` bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct PrivateActivityFlags: u32 {
        const INHERIT_SHOW_WHEN_LOCKED = 0x1;
        const HOME_TRANSITION_SOUND = 0x2;
    }
}

pub mod launch_mode {
    pub const STANDARD: i32 = 0;
    pub const SINGLE_TOP: i32 = 1;
    pub const SINGLE_TASK: i32 = 2;
    pub const SINGLE_INSTANCE: i32 = 3;
    pub const SINGLE_INSTANCE_PER_TASK: i32 = 4;
}

pub mod screen_orientation {
    pub const UNSPECIFIED: i32 = -1;
    pub const LANDSCAPE: i32 = 0;
    pub const PORTRAIT: i32 = 1;
    pub const USER: i32 = 2;
    pub const BEHIND: i32 = 3;
    pub const SENSOR: i32 = 4;
    pub const NOSENSOR: i32 = 5;
    pub const SENSOR_LANDSCAPE: i32 = 6;
    pub const SENSOR_PORTRAIT: i32 = 7;
    pub const REVERSE_LANDSCAPE: i32 = 8;
    pub const REVERSE_PORTRAIT: i32 = 9;
    pub const FULL_SENSOR: i32 = 10;
    pub const USER_LANDSCAPE: i32 = 11;
    pub const USER_PORTRAIT: i32 = 12;
    pub const FULL_USER: i32 = 13;
    pub const LOCKED: i32 = 14;

    pub fn is_fixed_landscape(orientation: i32) -> bool {
        matches!(
            orientation,
            LANDSCAPE | SENSOR_LANDSCAPE | REVERSE_LANDSCAPE | USER_LANDSCAPE
        )
    }

    pub fn is_fixed_portrait(orientation: i32) -> bool {
        matches!(
            orientation,
            PORTRAIT | SENSOR_PORTRAIT | REVERSE_PORTRAIT | USER_PORTRAIT
        )
    }
}

pub mod config_changes {
    pub const MCC: u32 = 0x0001;
    pub const MNC: u32 = 0x0002;
    /// Changes that recreate the activity unless `recreateOnConfigChanges` opts out
    pub const RECREATE_ON_CONFIG_CHANGES_MASK: u32 = MCC | MNC;
}

pub const DOCUMENT_LAUNCH_NONE: i32 = 0;
pub const PERSIST_ROOT_ONLY: i32 = 0;
pub const COLOR_MODE_DEFAULT: i32 = 0;
pub const ROTATION_ANIMATION_UNSPECIFIED: i32 = -1;
pub const DEFAULT_MAX_RECENTS: i32 = 8;

pub const GRAVITY_NONE: i32 = 0;
pub const GRAVITY_CENTER: i32 = 0x11;

/// Resize behaviour derived from `resizeableActivity`, target SDK and orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    Unresizeable = 0,
    ResizeableViaSdkVersion = 1,
    #[default]
    Resizeable = 2,
    ForceResizeable = 4,
    ForceResizableLandscapeOnly = 5,
    ForceResizablePortraitOnly = 6,
    ForceResizablePreserveOrientation = 7,
}

impl ResizeMode {
    pub fn is_resizeable(&self) -> bool {
        matches!(self, ResizeMode::Resizeable | ResizeMode::ResizeableViaSdkVersion)
    }
}

/// `<layout>` child of an activity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowLayout {
    pub width: i32,
    pub width_fraction: f32,
    pub height: i32,
    pub height_fraction: f32,
    pub gravity: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub window_layout_affinity: Option<String>,
}

impl WindowLayout {
    /// Layout synthesized when only the metadata affinity is present
    pub fn from_affinity(affinity: String) -> Self {
        Self {
            width: -1,
            width_fraction: -1.0,
            height: -1,
            height_fraction: -1.0,
            gravity: GRAVITY_NONE,
            min_width: -1,
            min_height: -1,
            window_layout_affinity: Some(affinity),
        }
    }
}

/// An `<activity>`, `<activity-alias>` or `<receiver>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    #[serde(flatten)]
    pub main: MainComponent,

    /// Set for aliases only
    pub target_activity: Option<String>,
    pub parent_activity_name: Option<String>,
    pub permission: Option<String>,
    pub task_affinity: Option<String>,

    pub theme: ResId,
    pub ui_options: i32,
    pub flags: ActivityFlags,
    pub private_flags: PrivateActivityFlags,

    pub launch_mode: i32,
    pub document_launch_mode: i32,
    pub persistable_mode: i32,
    pub lock_task_launch_mode: i32,
    pub max_recents: i32,
    pub config_changes: u32,
    pub soft_input_mode: i32,
    pub screen_orientation: i32,
    pub resize_mode: ResizeMode,
    pub max_aspect_ratio: Option<f32>,
    pub min_aspect_ratio: Option<f32>,
    pub supports_size_changes: bool,
    pub requested_vr_component: Option<String>,
    pub rotation_animation: i32,
    pub color_mode: i32,

    pub window_layout: Option<WindowLayout>,
}

impl Default for Activity {
    fn default() -> Self {
        Self {
            main: MainComponent::default(),
            target_activity: None,
            parent_activity_name: None,
            permission: None,
            task_affinity: None,
            theme: 0,
            ui_options: 0,
            flags: ActivityFlags::empty(),
            private_flags: PrivateActivityFlags::empty(),
            launch_mode: launch_mode::STANDARD,
            document_launch_mode: DOCUMENT_LAUNCH_NONE,
            persistable_mode: PERSIST_ROOT_ONLY,
            lock_task_launch_mode: 0,
            max_recents: DEFAULT_MAX_RECENTS,
            config_changes: 0,
            soft_input_mode: 0,
            screen_orientation: screen_orientation::UNSPECIFIED,
            resize_mode: ResizeMode::Resizeable,
            max_aspect_ratio: None,
            min_aspect_ratio: None,
            supports_size_changes: false,
            requested_vr_component: None,
            rotation_animation: ROTATION_ANIMATION_UNSPECIFIED,
            color_mode: COLOR_MODE_DEFAULT,
            window_layout: None,
        }
    }
}

impl Activity {
    /// Build an alias from its already-parsed target.
    ///
    /// Only the fields below are inherited. `enabled`, `exported`, `permission`,
    /// `split_name`, `document_launch_mode`, `persistable_mode`,
    /// `rotation_animation`, `color_mode`, intents, `order` and meta-data are
    /// left for the alias's own declaration.
    ///
    /// The copied icon, label and description are only a starting point: the
    /// alias tag's own component attributes are parsed over them, and an alias
    /// that omits `android:description` ends up with none.
    pub fn make_alias(target_activity: String, target: &Activity) -> Self {
        let mut alias = Activity::default();
        alias.main.component.package_name = target.package_name.clone();
        alias.target_activity = Some(target_activity);
        alias.config_changes = target.config_changes;
        alias.flags = target.flags;
        alias.private_flags = target.private_flags;
        alias.main.component.icon = target.icon;
        alias.main.component.logo = target.logo;
        alias.main.component.banner = target.banner;
        alias.main.component.label_res = target.label_res;
        alias.main.component.non_localized_label = target.non_localized_label.clone();
        alias.launch_mode = target.launch_mode;
        alias.lock_task_launch_mode = target.lock_task_launch_mode;
        alias.main.component.description_res = target.description_res;
        alias.screen_orientation = target.screen_orientation;
        alias.task_affinity = target.task_affinity.clone();
        alias.theme = target.theme;
        alias.soft_input_mode = target.soft_input_mode;
        alias.ui_options = target.ui_options;
        alias.parent_activity_name = target.parent_activity_name.clone();
        alias.max_recents = target.max_recents;
        alias.window_layout = target.window_layout.clone();
        alias.resize_mode = target.resize_mode;
        alias.max_aspect_ratio = target.max_aspect_ratio;
        alias.min_aspect_ratio = target.min_aspect_ratio;
        alias.supports_size_changes = target.supports_size_changes;
        alias.requested_vr_component = target.requested_vr_component.clone();
        alias.main.direct_boot_aware = target.direct_boot_aware;
        alias.main.process_name = target.process_name.clone();
        alias
    }

    /// No-op for resizeable activities; values in (0, 1) are ignored
    pub fn set_max_aspect_ratio(&mut self, resize_mode: ResizeMode, ratio: f32) {
        if resize_mode.is_resizeable() {
            return;
        }
        if ratio < 1.0 && ratio != 0.0 {
            return;
        }
        self.max_aspect_ratio = Some(ratio);
    }

    /// Same rules as [`Activity::set_max_aspect_ratio`]
    pub fn set_min_aspect_ratio(&mut self, resize_mode: ResizeMode, ratio: f32) {
        if resize_mode.is_resizeable() {
            return;
        }
        if ratio < 1.0 && ratio != 0.0 {
            return;
        }
        self.min_aspect_ratio = Some(ratio);
    }

    pub fn is_alias(&self) -> bool {
        self.target_activity.is_some()
    }
}

impl Deref for Activity {
    type Target = MainComponent;

    fn deref(&self) -> &MainComponent {
        &self.main
    }
}

impl DerefMut for Activity {
    fn deref_mut(&mut self) -> &mut MainComponent {
        &mut self.main
    }
}
