use super::ManifestOutcome;
use crate::parser::ParsedManifest;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, outcomes: &[ManifestOutcome]) -> Result<()> {
        let json = render(outcomes)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

/// Pretty-printed JSON for a batch of outcomes
pub fn render(outcomes: &[ManifestOutcome]) -> Result<String> {
    let report = JsonReport::from_outcomes(outcomes);
    serde_json::to_string_pretty(&report).into_diagnostic()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total_manifests: usize,
    failed: usize,
    manifests: Vec<JsonManifest<'a>>,
}

#[derive(Serialize)]
struct JsonManifest<'a> {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_set: Option<&'a str>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<&'a ParsedManifest>,
}

impl<'a> JsonReport<'a> {
    fn from_outcomes(outcomes: &'a [ManifestOutcome]) -> Self {
        let manifests: Vec<JsonManifest<'a>> = outcomes
            .iter()
            .map(|outcome| {
                let (status, error, manifest) = match &outcome.result {
                    Ok(manifest) => ("ok", None, Some(manifest)),
                    Err(message) => ("error", Some(message.as_str()), None),
                };
                JsonManifest {
                    path: outcome.path.to_string_lossy().to_string(),
                    source_set: outcome.source_set.as_deref(),
                    status,
                    error,
                    manifest,
                }
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION"),
            total_manifests: outcomes.len(),
            failed: outcomes.iter().filter(|o| !o.is_ok()).count(),
            manifests,
        }
    }
}
