//! # Framewise CLI
//!
//! Command-line front end for `estimate_core`: summarize `.fwe` project files,
//! start new projects and browse catalogs.

mod config;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use estimate_core::catalog::Catalog;
use estimate_core::errors::{EstimateError, EstimateResult};
use estimate_core::file_io::{load_project_with_lock_check, save_project, FileLock, LockInfo};
use estimate_core::level::Level as BuildingLevel;
use estimate_core::project::Project;
use estimate_core::wall_group::{WallGroup, WallKind};

use crate::config::Config;

/// Wall framing material estimates from the command line.
#[derive(Parser, Debug)]
#[command(name = "framewise")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "CONFIG_FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print per-level rows and project totals
    Summary {
        /// Project file (.fwe)
        file: PathBuf,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter project with one level and one exterior wall
    New {
        /// Project file to create (.fwe)
        file: PathBuf,

        #[arg(long, default_value = "")]
        estimator: String,

        #[arg(long, default_value = "")]
        job_id: String,

        #[arg(long, default_value = "")]
        client: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List catalog vendors, a vendor's families, or a family's sizes
    Catalog {
        /// Catalog JSON file (defaults to `catalog_path` from the config)
        file: Option<PathBuf>,

        #[arg(long)]
        vendor: Option<String>,

        #[arg(long, requires = "vendor")]
        family: Option<String>,
    },
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)]
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn lock_notice(file: &Path, holder: &LockInfo) -> String {
    format!(
        "Note: {} is open by {} on {} since {}; figures may change",
        file.display(),
        holder.user_id,
        holder.machine,
        holder.locked_at.format("%Y-%m-%d %H:%M UTC")
    )
}

fn summary(cfg: &Config, file: &Path, json: bool) -> EstimateResult<()> {
    let (mut project, holder) = load_project_with_lock_check(file)?;
    if let Some(holder) = &holder {
        warn!(
            path = %file.display(),
            holder = %holder.user_id,
            "Project is locked by another session"
        );
        eprintln!("{}", lock_notice(file, holder));
    }
    project.settings = cfg.apply_settings(&project.settings)?;
    project.settings.validate()?;

    let summary = project.summarize();
    info!(levels = summary.levels.len(), grand_total = summary.grand_total, "Project summarized");

    if json {
        let out = serde_json::to_string_pretty(&summary)
            .map_err(|e| EstimateError::serialization(e.to_string()))?;
        println!("{out}");
    } else {
        print!("{}", report::render_summary(&project, &summary));
    }
    Ok(())
}

fn starter_project(estimator: &str, job_id: &str, client: &str) -> EstimateResult<Project> {
    let mut project = Project::new(estimator, job_id, client);
    let mut level = BuildingLevel::new("Level 1");
    level.add_exterior(WallGroup::new("Exterior walls", WallKind::Exterior))?;
    project.add_level(level);
    Ok(project)
}

fn new_project(
    cfg: &Config,
    file: &Path,
    estimator: &str,
    job_id: &str,
    client: &str,
    force: bool,
) -> EstimateResult<()> {
    if file.exists() && !force {
        return Err(EstimateError::file_error(
            "create project",
            file.display().to_string(),
            "File exists (use --force to overwrite)",
        ));
    }

    let project = starter_project(estimator, job_id, client)?;
    let lock = FileLock::acquire(file, cfg.user_id())?;
    save_project(&project, file)?;
    drop(lock);

    info!(path = %file.display(), "Created project");
    println!("Created {}", file.display());
    Ok(())
}

fn catalog(
    cfg: &Config,
    file: Option<&Path>,
    vendor: Option<&str>,
    family: Option<&str>,
) -> EstimateResult<()> {
    let path = file
        .or(cfg.catalog_path.as_deref())
        .ok_or_else(|| EstimateError::missing_field("catalog_path"))?;
    let contents = std::fs::read_to_string(path).map_err(|e| {
        EstimateError::file_error("read catalog", path.display().to_string(), e.to_string())
    })?;
    let catalog = Catalog::from_json(&contents)?;
    info!(path = %path.display(), items = catalog.len(), "Loaded catalog");

    print!("{}", report::render_catalog(&catalog, vendor, family));
    Ok(())
}

fn run(args: Args, cfg: &Config) -> EstimateResult<()> {
    match args.command {
        Command::Summary { file, json } => summary(cfg, &file, json),
        Command::New {
            file,
            estimator,
            job_id,
            client,
            force,
        } => new_project(cfg, &file, &estimator, &job_id, &client, force),
        Command::Catalog { file, vendor, family } => {
            catalog(cfg, file.as_deref(), vendor.as_deref(), family.as_deref())
        }
    }
}

/// Entry point for the framewise CLI.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig file: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    init_tracing(get_log_level(args.verbose, args.quiet, &cfg.logging.level));

    match run(args, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.error_code(), error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
