//! `api-migrate` command line
//!
//! Parses arguments, installs logging, loads configuration and maps the
//! pipeline result to an exit code.

use std::path::PathBuf;
use std::sync::Arc;

use api_migrate_core::ConfigLoader;
use api_migrate_core::MigrateError;
use api_migrate_core::MigrationPlan;
use api_migrate_core::Orchestrator;
use api_migrate_core::Outcome;
use api_migrate_core::PipelineReport;
use api_migrate_core::ProcessRunner;
use clap::ArgAction;
use clap::Parser;
use owo_colors::OwoColorize;
use supports_color::Stream;
use tracing_subscriber::EnvFilter;

/// Upgrade an extension project across host API releases.
#[derive(Debug, Parser)]
#[command(name = "api-migrate", version, about)]
pub struct Cli {
    /// Extension project directory (holds package.json and package-lock.json)
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Migration catalog directory (default: `catalog.root`, then
    /// `migrations/` next to the executable)
    #[arg(long, value_name = "DIR")]
    pub catalog: Option<PathBuf>,

    /// Configuration file (default: `<PROJECT>/api-migrate.toml` if present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the migrations that would run, without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// More logging (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Run the CLI to completion and return the process exit code.
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    init_tracing(cli.verbose)?;

    match execute(&cli).await {
        Ok(()) => Ok(0),
        Err(err) => {
            report_failure(&err);
            Ok(1)
        }
    }
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(supports_color::on_cached(Stream::Stderr).is_some())
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))
}

async fn execute(cli: &Cli) -> Result<(), MigrateError> {
    let mut loader = ConfigLoader::new().with_project_root(&cli.project);
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let config = loader.load()?;
    let catalog_root = config.catalog_root(cli.catalog.as_deref())?;
    tracing::debug!("using catalog {}", catalog_root.display());

    let orchestrator = Orchestrator::new(config, catalog_root, Arc::new(ProcessRunner::new()));

    if cli.dry_run {
        let plan = orchestrator.plan(&cli.project)?;
        print_plan(&plan);
        return Ok(());
    }

    let report = orchestrator.run(&cli.project).await?;
    print_report(&report);
    Ok(())
}

fn stdout_colored() -> bool {
    supports_color::on_cached(Stream::Stdout).is_some()
}

fn print_report(report: &PipelineReport) {
    let project = report.project_root.display();
    match &report.outcome {
        Outcome::UpToDate { current } => {
            println!("{project} is already up to date ({current})");
        }
        Outcome::Migrated { from, to, applied } => {
            let headline = format!("Migrated {project} from {from} to {to}");
            if stdout_colored() {
                println!("{}", headline.green().bold());
            } else {
                println!("{headline}");
            }
            tracing::debug!("{} migration step(s) applied", applied.len());
        }
    }
}

fn print_plan(plan: &MigrationPlan) {
    let project = &plan.project;
    let current = &project.current_version;
    let Some(target) = plan.target() else {
        println!("{} is already up to date ({current})", project.root.display());
        return;
    };

    println!(
        "{}: {} {current} -> {target}",
        project.root.display(),
        project.host_package
    );
    for migration in &plan.applicable {
        let kinds = migration.artifacts.kinds();
        let description = if kinds.is_empty() {
            "version marker".to_string()
        } else {
            kinds
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        if stdout_colored() {
            println!("  {}  {description}", migration.version.cyan());
        } else {
            println!("  {}  {description}", migration.version);
        }
    }
    println!(
        "{} migration(s), {} with changes",
        plan.applicable.len(),
        plan.real_count()
    );
}

fn report_failure(err: &MigrateError) {
    let label = if supports_color::on_cached(Stream::Stderr).is_some() {
        "error".red().bold().to_string()
    } else {
        "error".to_string()
    };
    eprintln!("{label}: {} failed: {err}", err.phase());
}
