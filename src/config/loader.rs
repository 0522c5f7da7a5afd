use crate::parser::{ParseFlags, ParseOptions};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Configuration for manifestkit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Patterns to exclude from manifest discovery
    pub exclude: Vec<String>,

    /// Parser behaviour
    pub parse: ParseConfig,

    /// Values for `@string/...` references
    pub resources: ResourcesConfig,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Run every component in the application process
    pub ignore_processes: bool,

    /// Process names forced back into the application process
    pub separate_processes: Vec<String>,

    /// Fail on unknown tags and incomplete permission children
    pub strict: bool,

    /// Prefer `android:roundIcon` over `android:icon`
    pub use_round_icon: bool,

    /// Never escalate deferred errors, whatever the target SDK
    pub tolerate_deferred_errors: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// `name -> value` for `@string/name`
    pub strings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,

    /// List intent filter actions under each component
    pub show_intents: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: vec![
                "**/build/**".to_string(),
                "**/generated/**".to_string(),
                "**/.gradle/**".to_string(),
                "**/.idea/**".to_string(),
            ],
            parse: ParseConfig::default(),
            resources: ResourcesConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            show_intents: true,
        }
    }
}

impl ParseConfig {
    pub fn to_options(&self) -> ParseOptions {
        let flags = if self.ignore_processes {
            ParseFlags::IGNORE_PROCESSES
        } else {
            ParseFlags::empty()
        };

        ParseOptions {
            flags,
            separate_processes: self.separate_processes.clone(),
            strict: self.strict,
            use_round_icon: self.use_round_icon,
            tolerate_deferred_errors: self.tolerate_deferred_errors,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".manifestkit.yml",
            ".manifestkit.yaml",
            ".manifestkit.toml",
            "manifestkit.yml",
            "manifestkit.yaml",
            "manifestkit.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                debug!("Using config file: {}", path.display());
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check if a path matches one of the exclusion patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|pattern| glob_match(pattern, &path_str))
    }
}

/// Minimal glob matching for exclusion patterns like "**/build/**" or "*.bak"
fn glob_match(pattern: &str, text: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*') {
        if !pattern.contains('/') {
            return text.ends_with(suffix);
        }
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        if !pattern.contains('/') {
            return text.starts_with(prefix);
        }
    }

    if pattern.contains("**") {
        // "**/dir/**" matches a whole directory component anywhere
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern.trim_start_matches("**/").trim_end_matches("/**");
            return text.contains(&format!("/{}/", dir_name))
                || text.starts_with(&format!("{}/", dir_name));
        }

        if let Some((prefix, suffix)) = pattern.split_once("**") {
            let prefix = prefix.trim_end_matches('/');
            let suffix = suffix.trim_start_matches('/');

            let prefix_ok = prefix.is_empty()
                || text.starts_with(prefix)
                || text.contains(&format!("/{}/", prefix));
            let suffix_ok = suffix.is_empty()
                || text.ends_with(suffix)
                || text.contains(&format!("/{}", suffix));
            return prefix_ok && suffix_ok;
        }
    }

    text == pattern
}
