use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use meldric::aggregate::Engine;
use meldric::filter::{FilterConfig, Filters, MemberKindFilter};
use meldric::report::MetricsReport;
use meldric::thresholds::ThresholdTable;
use meldric::types::{ParsedDocument, Status, SuppressedSymbol};

#[derive(Parser)]
#[command(name = "meldric")]
#[command(about = "Merges coverage, code-metrics, and static-analysis signals into one quality report")]
struct Cli {
    /// Pre-parsed document JSON files, one per source tool invocation
    #[arg(required = true)]
    documents: Vec<PathBuf>,

    /// Threshold override JSON payload
    #[arg(long)]
    thresholds: Option<PathBuf>,

    /// Baseline report JSON for delta computation and new-symbol detection
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Suppressed-symbol list JSON
    #[arg(long)]
    suppressions: Option<PathBuf>,

    /// Where to write the merged report
    #[arg(long, short, default_value = "meldric-report.json")]
    output: PathBuf,

    /// Excluded member names/patterns, `,`/`;` separated
    #[arg(long, default_value = "")]
    member_filter: String,

    /// Excluded assembly names/patterns, `,`/`;` separated
    #[arg(long, default_value = "")]
    assembly_filter: String,

    /// Excluded type FQNs/patterns, `,`/`;` separated
    #[arg(long, default_value = "")]
    type_filter: String,

    /// Exclude method members
    #[arg(long)]
    exclude_methods: bool,

    /// Exclude property members
    #[arg(long)]
    exclude_properties: bool,

    /// Exclude field members
    #[arg(long)]
    exclude_fields: bool,

    /// Exclude event members
    #[arg(long)]
    exclude_events: bool,

    /// Print recoverable inconsistencies as they are found
    #[arg(long, short)]
    verbose: bool,
}

/// Exit codes: 0 clean, 1 when the report carries Error-status nodes, 2 for
/// fatal failures (unreadable input, malformed configuration, conflicting
/// elements).
fn main() {
    match run() {
        Ok(false) => {}
        Ok(true) => process::exit(1),
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            process::exit(2);
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    let overrides = match &cli.thresholds {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("reading thresholds {}", path.display()))?,
        ),
        None => None,
    };
    let (table, mut warnings) = ThresholdTable::resolve(overrides.as_deref())?;

    let filters = Filters::compile(&FilterConfig {
        member_patterns: cli.member_filter.clone(),
        assembly_patterns: cli.assembly_filter.clone(),
        type_patterns: cli.type_filter.clone(),
        kinds: MemberKindFilter {
            exclude_methods: cli.exclude_methods,
            exclude_properties: cli.exclude_properties,
            exclude_fields: cli.exclude_fields,
            exclude_events: cli.exclude_events,
        },
    })?;

    // Upstream parsing may run concurrently; the engine itself is a single
    // synchronous pass.
    let documents: Vec<ParsedDocument> = cli
        .documents
        .par_iter()
        .map(|path| read_document(path))
        .collect::<Result<_>>()?;

    let baseline: Option<MetricsReport> = match &cli.baseline {
        Some(path) => Some(read_json(path).context("reading baseline report")?),
        None => None,
    };
    let suppressions: Vec<SuppressedSymbol> = match &cli.suppressions {
        Some(path) => read_json(path).context("reading suppressions")?,
        None => Vec::new(),
    };

    let engine = Engine::new(filters, table);
    let outcome = engine.run(&documents, baseline.as_ref(), &suppressions)?;
    warnings.extend(outcome.warnings.clone());

    if cli.verbose {
        for warning in &warnings {
            eprintln!("{} {warning}", "warn:".yellow().bold());
        }
    }

    let json = serde_json::to_string_pretty(&outcome.report)?;
    fs::write(&cli.output, json)
        .with_context(|| format!("writing report {}", cli.output.display()))?;

    print_summary(&outcome.report, warnings.len());

    Ok(outcome.report.has_errors())
}

fn read_document(path: &Path) -> Result<ParsedDocument> {
    read_json(path).with_context(|| format!("reading document {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_summary(report: &MetricsReport, warning_count: usize) {
    let counts = report.status_counts();
    let get = |s: Status| counts.get(&s).copied().unwrap_or(0);
    println!(
        "{} {} | {} {} | {} {} | {} {}",
        "error:".red().bold(),
        get(Status::Error),
        "warning:".yellow().bold(),
        get(Status::Warning),
        "success:".green().bold(),
        get(Status::Success),
        "n/a:".dimmed(),
        get(Status::Na),
    );
    if warning_count > 0 {
        println!(
            "{}",
            format!("{warning_count} recoverable inconsistencies (rerun with -v)").yellow()
        );
    }
}
