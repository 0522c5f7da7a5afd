use super::component::ResId;
use super::pattern::PatternMatcher;
use serde::Serialize;

pub const CATEGORY_DEFAULT: &str = "android.intent.category.DEFAULT";
pub const CATEGORY_BROWSABLE: &str = "android.intent.category.BROWSABLE";
pub const ACTION_SEND: &str = "android.intent.action.SEND";
pub const ACTION_SENDTO: &str = "android.intent.action.SENDTO";
pub const ACTION_SEND_MULTIPLE: &str = "android.intent.action.SEND_MULTIPLE";

/// Whether an intent filter can be reached by instant apps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstantAppVisibility {
    #[default]
    None,
    Explicit,
    Implicit,
}

/// `<data android:host android:port>` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authority {
    /// Host without the leading `*` wildcard
    pub host: String,
    /// Host started with `*`, matching any subdomain
    pub wild: bool,
    pub port: Option<u16>,
}

impl Authority {
    pub fn new(host: &str, port: Option<&str>) -> Result<Self, String> {
        let wild = host.starts_with('*');
        let host = if wild { &host[1..] } else { host };
        let port = match port {
            Some(p) => Some(
                p.trim()
                    .parse::<u16>()
                    .map_err(|_| format!("Invalid port number: {}", p))?,
            ),
            None => None,
        };
        Ok(Self {
            host: host.to_string(),
            wild,
            port,
        })
    }

    pub fn matches_host(&self, host: &str) -> bool {
        if self.wild {
            host.ends_with(&self.host)
        } else {
            host.eq_ignore_ascii_case(&self.host)
        }
    }
}

/// An `<intent-filter>` (or `<preferred>`) declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntentFilter {
    pub actions: Vec<String>,
    pub categories: Vec<String>,
    pub data_schemes: Vec<String>,

    /// Full mime types; `type/*` entries are stored as the bare `type`
    pub data_types: Vec<String>,
    pub has_partial_types: bool,
    pub mime_groups: Vec<String>,

    pub scheme_specific_parts: Vec<PatternMatcher>,
    pub authorities: Vec<Authority>,
    pub paths: Vec<PatternMatcher>,

    pub priority: i32,
    pub order: i32,
    pub auto_verify: bool,
    pub has_default: bool,

    pub label_res: ResId,
    pub non_localized_label: Option<String>,
    pub icon: ResId,

    pub visibility: InstantAppVisibility,
}

impl IntentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions keep first-insertion order and are never duplicated
    pub fn add_action(&mut self, action: &str) {
        push_unique(&mut self.actions, action);
    }

    pub fn add_category(&mut self, category: &str) {
        push_unique(&mut self.categories, category);
    }

    pub fn add_data_scheme(&mut self, scheme: &str) {
        push_unique(&mut self.data_schemes, scheme);
    }

    pub fn add_mime_group(&mut self, group: &str) {
        push_unique(&mut self.mime_groups, group);
    }

    /// Add a `type/subtype` mime type. `type/*` is stored as a partial type.
    pub fn add_data_type(&mut self, mime: &str) -> Result<(), String> {
        let slash = match mime.find('/') {
            Some(pos) if pos > 0 && mime.len() >= pos + 2 => pos,
            _ => return Err(format!("Malformed mime type: {}", mime)),
        };

        if mime.len() == slash + 2 && mime.ends_with('*') {
            push_unique(&mut self.data_types, &mime[..slash]);
            self.has_partial_types = true;
        } else {
            push_unique(&mut self.data_types, mime);
        }
        Ok(())
    }

    pub fn add_authority(&mut self, authority: Authority) {
        self.authorities.push(authority);
    }

    pub fn add_path(&mut self, path: PatternMatcher) {
        self.paths.push(path);
    }

    pub fn add_scheme_specific_part(&mut self, ssp: PatternMatcher) {
        self.scheme_specific_parts.push(ssp);
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn count_actions(&self) -> usize {
        self.actions.len()
    }

    /// Filters an instant app could reach without the component opting in
    pub fn is_implicitly_exposed(&self) -> bool {
        self.has_category(CATEGORY_BROWSABLE)
            || self.has_action(ACTION_SEND)
            || self.has_action(ACTION_SENDTO)
            || self.has_action(ACTION_SEND_MULTIPLE)
    }

    pub fn is_visible_to_instant_app(&self) -> bool {
        self.visibility != InstantAppVisibility::None
    }

    pub fn is_explicitly_visible_to_instant_app(&self) -> bool {
        self.visibility == InstantAppVisibility::Explicit
    }

    pub fn is_implicitly_visible_to_instant_app(&self) -> bool {
        self.visibility == InstantAppVisibility::Implicit
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
