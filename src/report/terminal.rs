use super::ManifestOutcome;
use crate::model::permission::protection;
use crate::model::{IntentFilter, MainComponent, ParsedPackage};
use colored::Colorize;
use miette::Result;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// List intent filter actions under each component
    show_intents: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { show_intents: true }
    }

    pub fn with_intents(mut self, show: bool) -> Self {
        self.show_intents = show;
        self
    }

    pub fn report(&self, outcomes: &[ManifestOutcome]) -> Result<()> {
        if outcomes.is_empty() {
            println!("{}", "No AndroidManifest.xml files found.".yellow());
            return Ok(());
        }

        println!();
        for outcome in outcomes {
            self.print_outcome(outcome);
            println!();
        }

        self.print_summary(outcomes);
        Ok(())
    }

    fn print_outcome(&self, outcome: &ManifestOutcome) {
        let header = match &outcome.source_set {
            Some(set) => format!("{} ({})", outcome.path.display(), set),
            None => outcome.path.display().to_string(),
        };
        println!("{}", header.cyan().bold());

        let manifest = match &outcome.result {
            Ok(manifest) => manifest,
            Err(message) => {
                println!("  {} {}", "error".red().bold(), message);
                return;
            }
        };

        let pkg = &manifest.package;
        println!(
            "  {} {} {}",
            "package".dimmed(),
            pkg.package_name.white().bold(),
            format!("(minSdk {}, targetSdk {})", pkg.min_sdk, pkg.target_sdk).dimmed()
        );
        if let Some(class_name) = &pkg.class_name {
            println!("  {} {}", "application".dimmed(), class_name);
        }

        self.print_main_components("activities", pkg.activities.iter().map(|a| &a.main), pkg);
        self.print_main_components("receivers", pkg.receivers.iter().map(|r| &r.main), pkg);
        self.print_main_components("services", pkg.services.iter().map(|s| &s.main), pkg);
        self.print_main_components("providers", pkg.providers.iter().map(|p| &p.main), pkg);

        if !pkg.permissions.is_empty() {
            println!("  {}", format!("permissions ({})", pkg.permissions.len()).bold());
            for permission in &pkg.permissions {
                let level = if permission.tree {
                    "tree".to_string()
                } else {
                    protection::name(permission.protection()).to_string()
                };
                println!("    {} {}", permission.name, format!("[{}]", level).dimmed());
            }
        }

        if !pkg.permission_groups.is_empty() {
            println!("  {}", format!("permission groups ({})", pkg.permission_groups.len()).bold());
            for group in &pkg.permission_groups {
                println!("    {}", group.name);
            }
        }

        if !pkg.instrumentations.is_empty() {
            println!("  {}", format!("instrumentation ({})", pkg.instrumentations.len()).bold());
            for instrumentation in &pkg.instrumentations {
                let target = instrumentation.target_package.as_deref().unwrap_or("?");
                println!("    {} {} {}", instrumentation.name, "→".dimmed(), target);
            }
        }

        if !pkg.processes.is_empty() {
            println!("  {}", format!("processes ({})", pkg.processes.len()).bold());
            for process in pkg.processes.values() {
                let denied = if process.denied_permissions.is_empty() {
                    String::new()
                } else {
                    format!(" denies {}", process.denied_permissions.len())
                };
                println!("    {}{}", process.name, denied.dimmed());
            }
        }

        for deferred in &manifest.deferred_errors {
            println!(
                "  {} {} {}",
                "tolerated".yellow(),
                deferred.message,
                format!("[{}]", deferred.kind.as_str()).dimmed()
            );
        }
    }

    fn print_main_components<'a>(
        &self,
        title: &str,
        components: impl ExactSizeIterator<Item = &'a MainComponent>,
        pkg: &ParsedPackage,
    ) {
        if components.len() == 0 {
            return;
        }

        println!("  {}", format!("{} ({})", title, components.len()).bold());
        for component in components {
            let mut badges = Vec::new();
            if component.exported {
                badges.push("exported".green().to_string());
            }
            if !component.enabled {
                badges.push("disabled".red().to_string());
            }
            if let Some(process) = &component.process_name {
                if process.as_str() != pkg.process_name() {
                    badges.push(format!("process {}", process).magenta().to_string());
                }
            }

            println!("    {} {}", component.name, badges.join(" "));

            if self.show_intents {
                for filter in &component.intents {
                    println!("      {} {}", "→".dimmed(), describe_filter(filter).dimmed());
                }
            }
        }
    }

    fn print_summary(&self, outcomes: &[ManifestOutcome]) {
        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        let components: usize = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|m| m.package.component_count())
            .sum();

        println!("{}", "─".repeat(60).dimmed());
        let mut parts = vec![format!("{} manifests", outcomes.len())];
        parts.push(format!("{} components", components));
        if failed > 0 {
            parts.push(format!("{} failed", failed).red().to_string());
        }
        println!("Summary: {}", parts.join(", "));
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line description: actions, then categories and schemes when present
fn describe_filter(filter: &IntentFilter) -> String {
    let mut parts = Vec::new();
    if filter.actions.is_empty() {
        parts.push("(no action)".to_string());
    } else {
        parts.push(filter.actions.join(", "));
    }
    if !filter.categories.is_empty() {
        parts.push(format!("categories: {}", filter.categories.join(", ")));
    }
    if !filter.data_schemes.is_empty() {
        parts.push(format!("schemes: {}", filter.data_schemes.join(", ")));
    }
    if filter.priority != 0 {
        parts.push(format!("priority {}", filter.priority));
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_filter() {
        let mut filter = IntentFilter::new();
        filter.add_action("android.intent.action.VIEW");
        filter.add_category("android.intent.category.BROWSABLE");
        filter.add_data_scheme("https");
        filter.priority = 10;

        assert_eq!(
            describe_filter(&filter),
            "android.intent.action.VIEW; categories: android.intent.category.BROWSABLE; schemes: https; priority 10"
        );
        assert_eq!(describe_filter(&IntentFilter::new()), "(no action)");
    }
}
