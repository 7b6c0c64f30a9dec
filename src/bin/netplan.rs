use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use netplan_gen::logging::{LogFormat, LoggingConfig, init_logging};
use netplan_gen::{
    AuditLimits, DatasetCounts, GenerationSummary, Generator, GeneratorConfig, SeedData,
    SqliteDatasetStore, audit_dataset,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "netplan")]
#[command(about = "Generate and audit synthetic project-network scheduling datasets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// trace, debug, info, warn, error or off
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// text or json
    #[arg(long, default_value = "text", global = true)]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate networks, operations, relationships and assignments
    Generate {
        /// SQLite database to write
        #[arg(long)]
        db: PathBuf,
        /// Seed data (.json or .sql). When given, any existing database is replaced.
        #[arg(long)]
        seed_data: Option<PathBuf>,
        /// Generator configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Fixed RNG seed, overriding the config file
        #[arg(long)]
        seed: Option<u64>,
        /// Write the run summary as JSON to this path
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },
    /// Check a generated dataset against its structural invariants
    Audit {
        #[arg(long)]
        db: PathBuf,
        /// Generator configuration the dataset was produced with (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Count resource overlaps and window overruns as violations
        #[arg(long)]
        strict_overlaps: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = match cli.log_format.as_str() {
        "json" => LogFormat::Json,
        "text" => LogFormat::Text,
        other => {
            eprintln!("unknown log format '{other}' (expected text or json)");
            return ExitCode::FAILURE;
        }
    };
    let logging = LoggingConfig {
        level: cli.log_level.clone(),
        format,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Generate {
            db,
            seed_data,
            config,
            seed,
            summary_json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if seed.is_some() {
                config.seed = seed;
            }
            let summary = generate(&db, seed_data.as_deref(), config)?;
            print_counts(&summary.dataset);
            println!("Summary            : {}", summary.to_cli_summary());
            if let Some(path) = summary_json {
                let file = File::create(&path)
                    .with_context(|| format!("cannot create {}", path.display()))?;
                serde_json::to_writer_pretty(file, &summary)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Audit {
            db,
            config,
            strict_overlaps,
            json,
        } => {
            let limits = match config {
                Some(path) => AuditLimits::from(&load_config(Some(&path))?),
                None => AuditLimits::default(),
            };
            let store = SqliteDatasetStore::open(&db)?;
            let report = audit_dataset(&store.snapshot()?, limits);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Audit              : {}", report.to_cli_summary());
            }
            let violations = report.violation_count(strict_overlaps);
            if violations > 0 {
                println!("Violations         : {violations}");
                return Ok(ExitCode::from(2));
            }
            println!("Dataset OK");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::from_json_file(path)
            .with_context(|| format!("cannot load config {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

fn generate(
    db: &Path,
    seed_data: Option<&Path>,
    config: GeneratorConfig,
) -> anyhow::Result<GenerationSummary> {
    let mut generator = Generator::from_config(config)?;

    let mut store = match seed_data {
        Some(seed_path) => {
            if db.exists() {
                info!(path = %db.display(), "replacing existing database");
                fs::remove_file(db)
                    .with_context(|| format!("cannot remove {}", db.display()))?;
            }
            let mut store = SqliteDatasetStore::create(db)?;
            load_seed(&mut store, seed_path)?;
            store
        }
        None => SqliteDatasetStore::open(db)?,
    };

    let session = store.session()?;
    Ok(generator.run(session)?)
}

fn load_seed(store: &mut SqliteDatasetStore, path: &Path) -> anyhow::Result<()> {
    info!(path = %path.display(), "loading seed data");
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            let seed = SeedData::from_json_file(path)
                .with_context(|| format!("cannot read seed {}", path.display()))?;
            store.load_seed(&seed)?;
        }
        Some("sql") => store.load_seed_sql(path)?,
        _ => bail!(
            "unsupported seed file {} (expected .json or .sql)",
            path.display()
        ),
    }
    Ok(())
}

fn print_counts(counts: &DatasetCounts) {
    println!("Projects           : {}", counts.projects);
    println!("Networks           : {}", counts.networks);
    println!("Operations         : {}", counts.operations);
    println!("Relationships      : {}", counts.relationships);
    println!("Assignments        : {}", counts.assignments);
    println!("Active employees   : {}", counts.active_employees);
    println!("Resources          : {}", counts.resources);
    println!("Facilities         : {}", counts.facilities);
}
