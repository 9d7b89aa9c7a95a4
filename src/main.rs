//! Convo-Archiver main entry point
//!
//! This is the command-line interface for the Convo-Archiver conversation
//! archive walker.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use convo_archiver::config::{load_config_with_hash, validate, Config};
use convo_archiver::crawler::{
    Coordinator, CrawlMode, ImmediateGate, PromptGate, ReadyGate, RunReport,
};
use convo_archiver::document::{Document, HttpDocument, SnapshotDocument};
use convo_archiver::output::{
    export_dir_name, load_statistics, print_statistics, ExportSink, FileSink, MemorySink,
};
use convo_archiver::state::SeenSet;
use convo_archiver::storage::open_storage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Convo-Archiver: exports a conversation archive to Markdown
///
/// Walks the root conversation list and, optionally, every project of a
/// conversation archive, exporting each conversation exactly once as
/// Markdown with JSON metadata.
#[derive(Parser, Debug)]
#[command(name = "convo-archiver")]
#[command(version = "1.0.0")]
#[command(about = "Exports a conversation archive to Markdown", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Export only the conversations of this project
    #[arg(short, long, value_name = "NAME", conflicts_with = "all")]
    project: Option<String>,

    /// Export root conversations and every project
    #[arg(short, long)]
    all: bool,

    /// Tagging keywords recorded with each export
    #[arg(short, long, num_args = 1.., value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// Only export conversations mentioning at least one of these terms
    #[arg(short, long, num_args = 1.., value_name = "TERM")]
    filter: Vec<String>,

    /// Read saved pages from this directory instead of the live archive
    #[arg(long, value_name = "DIR")]
    snapshot: Option<PathBuf>,

    /// Do not wait for ENTER before starting
    #[arg(long)]
    no_prompt: bool,

    /// Walk the archive without writing any files
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the export manifest and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load(cli.config.as_deref())?;

    if cli.stats {
        return handle_stats(&config);
    }

    let mode = CrawlMode::from_selection(cli.project.clone(), cli.all);
    let mut gate: Box<dyn ReadyGate> = if cli.no_prompt {
        Box::new(ImmediateGate)
    } else {
        Box::new(PromptGate)
    };

    let report = match &cli.snapshot {
        Some(dir) => {
            let document = SnapshotDocument::from_dir(&config.session.start_url, dir)
                .with_context(|| format!("Failed to load snapshots from {}", dir.display()))?;
            tracing::info!("Loaded {} saved pages from {}", document.len(), dir.display());
            handle_run(&cli, config, &config_hash, &mode, document, gate.as_mut()).await?
        }
        None => {
            let document = HttpDocument::from_config(&config.session)
                .context("Failed to build HTTP session")?;
            handle_run(&cli, config, &config_hash, &mode, document, gate.as_mut()).await?
        }
    };

    print_report(&report);
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("convo_archiver=info,warn"),
            1 => EnvFilter::new("convo_archiver=debug,info"),
            2 => EnvFilter::new("convo_archiver=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load(path: Option<&Path>) -> Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            let config = Config::default();
            validate(&config).context("Default configuration is invalid")?;
            tracing::info!("No configuration file given, using defaults");
            Ok((config, "default".to_string()))
        }
    }
}

/// Handles the --stats mode: shows statistics from the manifest
fn handle_stats(config: &Config) -> Result<()> {
    println!("Manifest: {}\n", config.output.manifest_path);

    let storage = open_storage(Path::new(&config.output.manifest_path))
        .context("Failed to open the export manifest")?;
    let stats = load_statistics(&storage).context("Failed to read the export manifest")?;
    print_statistics(&stats);

    Ok(())
}

/// Picks the sink and runs the coordinator over `document`
async fn handle_run<D: Document>(
    cli: &Cli,
    config: Config,
    config_hash: &str,
    mode: &CrawlMode,
    document: D,
    gate: &mut dyn ReadyGate,
) -> Result<RunReport> {
    if cli.dry_run {
        tracing::info!("Dry run: nothing will be written");
        return execute(cli, config, mode, document, MemorySink::new(), gate).await;
    }

    let dir_name = export_dir_name(mode, &cli.keywords, &Local::now());
    let root = Path::new(&config.output.directory).join(dir_name);
    let mut sink = FileSink::new(root, &config.output, config_hash);

    if config.output.write_manifest {
        let manifest = open_storage(Path::new(&config.output.manifest_path))
            .context("Failed to open the export manifest")?;
        sink = sink.with_manifest(manifest);
    }

    execute(cli, config, mode, document, sink, gate).await
}

async fn execute<D: Document, S: ExportSink>(
    cli: &Cli,
    config: Config,
    mode: &CrawlMode,
    document: D,
    sink: S,
    gate: &mut dyn ReadyGate,
) -> Result<RunReport> {
    let mut coordinator = Coordinator::new(config, document, sink)
        .with_tags(cli.keywords.clone())
        .with_filter(cli.filter.clone());

    let mut seen = SeenSet::new();
    coordinator
        .run(mode, gate, &mut seen)
        .await
        .context("Archive run failed")
}

fn print_report(report: &RunReport) {
    println!("\n=== Export Summary ({}) ===", report.mode);
    for phase in &report.phases {
        if phase.navigation_failed {
            println!("  {}: not reachable", phase.scope);
            continue;
        }
        println!(
            "  {}: {} found, {} attempted, {} exported, {} skipped",
            phase.scope, phase.discovered, phase.attempted, phase.exported, phase.skipped
        );
    }
    println!(
        "Total: {} attempted, {} exported, {} skipped ({} failed), {} unique conversations",
        report.attempted(),
        report.exported(),
        report.skipped(),
        report.failed(),
        report.seen
    );
}
