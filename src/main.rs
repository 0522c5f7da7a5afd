use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use manifestkit::config::Config;
use manifestkit::discovery::{FileFinder, ManifestFile};
use manifestkit::parser::{ManifestParser, ParseFlags};
use manifestkit::report::{ManifestOutcome, ReportFormat, Reporter};
use miette::{miette, Result};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// manifestkit - Parse AndroidManifest.xml files into typed components
#[derive(Parser, Debug)]
#[command(name = "manifestkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Manifest file, or project directory to search for AndroidManifest.xml
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (defaults to the config file's report.format)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Process name forced into the application process (can be specified multiple times)
    #[arg(long, value_name = "NAME")]
    separate_process: Vec<String>,

    /// Run every component in the application process
    #[arg(long)]
    ignore_processes: bool,

    /// Treat unknown tags and incomplete permission children as errors
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("manifestkit v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run(&config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        let root = if cli.path.is_file() {
            cli.path.parent().map(PathBuf::from).unwrap_or_default()
        } else {
            cli.path.clone()
        };
        Config::from_default_locations(&root)?
    };

    // Override with CLI arguments
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if !cli.separate_process.is_empty() {
        config.parse.separate_processes.extend(cli.separate_process.clone());
    }
    if cli.ignore_processes {
        config.parse.ignore_processes = true;
    }
    if cli.strict {
        config.parse.strict = true;
    }

    Ok(config)
}

fn report_format(config: &Config, cli: &Cli) -> ReportFormat {
    if let Some(format) = cli.format {
        return format.into();
    }
    ReportFormat::from_name(&config.report.format).unwrap_or_else(|| {
        warn!("Unknown report format '{}', using terminal", config.report.format);
        ReportFormat::Terminal
    })
}

fn run(config: &Config, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    info!("Discovering manifests...");
    let finder = FileFinder::new(config);
    let manifests = finder.find_manifests(&cli.path)?;
    info!("Found {} manifests", manifests.len());

    let options = config.parse.to_options();
    if options.flags.contains(ParseFlags::IGNORE_PROCESSES) {
        info!("Ignoring android:process attributes");
    }
    let parser = ManifestParser::new(options).with_strings(config.resources.strings.clone());

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(manifests.len() as u64)
    };
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    // Each manifest owns its own parse state, so they can run side by side
    let outcomes: Vec<ManifestOutcome> = manifests
        .par_iter()
        .map(|manifest| {
            let outcome = parse_one(&parser, manifest);
            pb.inc(1);
            outcome
        })
        .collect();
    pb.finish_and_clear();

    info!(
        "Parsed {} manifests in {:.2}s",
        outcomes.len(),
        start_time.elapsed().as_secs_f64()
    );

    let reporter = Reporter::new(report_format(config, cli), cli.output.clone())
        .with_intents(config.report.show_intents);
    reporter.report(&outcomes)?;

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        if !cli.quiet {
            eprintln!("{}", format!("{} of {} manifests failed to parse", failed, outcomes.len()).red());
        }
        return Err(miette!("{} manifest(s) failed to parse", failed));
    }

    Ok(())
}

fn parse_one(parser: &ManifestParser, manifest: &ManifestFile) -> ManifestOutcome {
    let result = manifest
        .read_contents()
        .and_then(|contents| parser.parse(&manifest.path, &contents))
        .map_err(|report| {
            debug!("{:?}", report);
            report
                .chain()
                .map(|cause| cause.to_string())
                .collect::<Vec<_>>()
                .join(": ")
        });

    ManifestOutcome {
        path: manifest.path.clone(),
        source_set: manifest.source_set.clone(),
        result,
    }
}
