//! CrewLedger CLI — verify trip exports, settle a trip, export artifacts.
//!
//! Commands:
//! - `verify` — per-expense verification and settlement plan for every trip file
//! - `settle` — strict settlement of one trip, as text or JSON
//! - `export` — write manifest, CSV, JSON and Markdown artifacts for one trip

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crewledger_core::settle_trip;
use crewledger_runner::reporting::{text, ArtifactManager, MarkdownReportGenerator};
use crewledger_runner::{
    discover_trip_files, load_trip, verify_all, verify_file, RunnerConfig,
};

/// Looked up in the working directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "crewledger.toml";

#[derive(Parser)]
#[command(
    name = "crewledger",
    version,
    about = "CrewLedger CLI — split trip expenses and settle up with as few payments as possible"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./crewledger.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify trip exports and print each settlement plan.
    Verify {
        /// Trip export files, or directories to scan for exports.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Settle one trip strictly: any invalid expense is an error.
    Settle {
        /// Trip export file.
        file: PathBuf,

        /// Print the full settlement as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the artifact set (manifest, CSVs, plan JSON, report) for one trip.
    Export {
        /// Trip export file.
        file: PathBuf,

        /// Directory to write artifacts into.
        #[arg(long)]
        output_dir: PathBuf,

        /// Skip the Markdown report.
        #[arg(long, default_value_t = false)]
        no_report: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Verify { paths } => run_verify(&paths, &config),
        Commands::Settle { file, json } => run_settle(&file, json, &config),
        Commands::Export {
            file,
            output_dir,
            no_report,
        } => run_export(&file, &output_dir, no_report, &config),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>) -> Result<RunnerConfig> {
    if let Some(path) = explicit {
        return RunnerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        tracing::debug!(path = DEFAULT_CONFIG_FILE, "using config from working directory");
        return RunnerConfig::from_file(default_path)
            .with_context(|| format!("failed to load config {DEFAULT_CONFIG_FILE}"));
    }
    Ok(RunnerConfig::default())
}

fn run_verify(inputs: &[PathBuf], config: &RunnerConfig) -> Result<()> {
    let files = discover_trip_files(inputs, &config.discovery.file_prefix)?;
    if files.is_empty() {
        println!(
            "No '{}*.json' files found.",
            config.discovery.file_prefix
        );
        return Ok(());
    }

    let items = verify_all(&files, config);
    let mut failed = 0;
    for item in &items {
        match &item.outcome {
            Ok(report) => {
                println!("{}", text::render_verification(report, &config.currency));
            }
            Err(err) => {
                failed += 1;
                eprintln!("Error processing {}: {err:#}", item.path.display());
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} trip file(s) could not be processed", items.len());
        std::process::exit(1);
    }
    Ok(())
}

fn run_settle(file: &Path, json: bool, config: &RunnerConfig) -> Result<()> {
    let trip = load_trip(file, &config.currency.code)
        .with_context(|| format!("failed to load {}", file.display()))?;
    let settlement = settle_trip(&trip.snapshot)
        .with_context(|| format!("failed to settle {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settlement)?);
        return Ok(());
    }

    let participants = &trip.snapshot.participants;
    println!("Trip: {} ({})", trip.name, trip.currency);
    println!("{}", text::render_balances(&settlement, participants, &config.currency));
    print!("{}", text::render_plan(&settlement, participants, &config.currency));
    Ok(())
}

fn run_export(
    file: &Path,
    output_dir: &Path,
    no_report: bool,
    config: &RunnerConfig,
) -> Result<()> {
    let report = verify_file(file, config)?;
    let manager = ArtifactManager::new(output_dir)?;

    let markdown = (config.export.write_markdown && !no_report).then(|| {
        MarkdownReportGenerator::new(config.currency.clone())
            .generate(&report, &report.settlement.fingerprint())
    });
    let paths = manager.save_plan(&report, markdown.as_deref())?;

    if !report.is_clean() {
        eprintln!(
            "warning: {} invalid expense(s) were left out of the plan",
            report.invalid_count()
        );
    }
    println!("Artifacts written to {}", paths.dir.display());
    Ok(())
}
