pub mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::parser::ParsedManifest;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

impl ReportFormat {
    /// Format named in a config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "terminal" | "text" => Some(ReportFormat::Terminal),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// What happened to one manifest
#[derive(Debug)]
pub struct ManifestOutcome {
    pub path: PathBuf,
    pub source_set: Option<String>,
    /// The parsed manifest, or the error chain rendered as one line
    pub result: std::result::Result<ParsedManifest, String>,
}

impl ManifestOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Reporter for parsed manifests
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    show_intents: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            show_intents: true,
        }
    }

    pub fn with_intents(mut self, show_intents: bool) -> Self {
        self.show_intents = show_intents;
        self
    }

    pub fn report(&self, outcomes: &[ManifestOutcome]) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalReporter::new().with_intents(self.show_intents);
                reporter.report(outcomes)
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new(self.output_path.clone());
                reporter.report(outcomes)
            }
        }
    }
}
