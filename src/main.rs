//! Wildsync CLI entrypoint.
//!
//! This is the main entrypoint for the wildsync command-line tool.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use wildsync::cli::{Cli, Commands, OutputFormatter};
use wildsync::config::{ConfigParser, ConfigValidator, SyncConfig, find_config_file};
use wildsync::error::{ConfigError, ReconcileError, Result, WildsyncError};
use wildsync::reconciler::{
    ApplyReport, PlanEntry, PlanReport, ReconcileOutcome, Reconciler, ResourceAction,
    ResourceResult, ResourceStatus, StatusReport,
};
use wildsync::resources::{self, Resource};
use wildsync::secrets::{SecretBackend, SecretStore};
use wildsync::transport::{JBossCli, Transport};

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings, &formatter),
        Commands::Plan { detailed } => cmd_plan(cli.config.as_ref(), detailed, &formatter).await,
        Commands::Apply {
            yes,
            continue_on_error,
        } => cmd_apply(cli.config.as_ref(), yes, continue_on_error, &formatter).await,
        Commands::Status => cmd_status(cli.config.as_ref(), &formatter).await,
        Commands::Remove { name, yes } => {
            cmd_remove(cli.config.as_ref(), &name, yes, &formatter).await
        }
    }
}

/// Validate configuration.
fn cmd_validate(
    config_path: Option<&PathBuf>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (config, result) = load_config(config_path)?;
    info!(
        "Configuration valid with {} resource(s)",
        config.resource_count()
    );

    eprintln!("{}", formatter.format_validation(&result, show_warnings));

    eprintln!("Configuration summary:");
    eprintln!("  Server: {}", config.server.jboss_home);
    eprintln!("  Secret backend: {}", config.secrets.backend);
    eprintln!("  Resources: {}", config.resource_count());

    Ok(())
}

/// Show the reconciliation plan (dry run).
async fn cmd_plan(
    config_path: Option<&PathBuf>,
    detailed: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (config, _) = load_config(config_path)?;
    let transport = build_transport(&config);
    let reconciler: Reconciler<'_, dyn Transport> = Reconciler::new(&transport);
    let drivers = build_resources(&config)?;

    let plan = compute_plan(&drivers, &reconciler).await?;
    eprintln!("{}", formatter.format_plan(&plan, detailed));

    Ok(())
}

/// Reconcile the server onto the desired state.
async fn cmd_apply(
    config_path: Option<&PathBuf>,
    auto_approve: bool,
    continue_on_error: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (config, _) = load_config(config_path)?;
    let transport = build_transport(&config);
    let reconciler: Reconciler<'_, dyn Transport> = Reconciler::new(&transport);
    let drivers = build_resources(&config)?;

    // Dry run first so the user sees what will happen.
    let plan = compute_plan(&drivers, &reconciler).await?;
    if plan.is_converged() {
        eprintln!("No changes to apply.");
        return Ok(());
    }
    eprintln!("{}", formatter.format_plan(&plan, false));

    if !auto_approve && !confirm("Do you want to apply this plan? [y/N]: ")? {
        eprintln!("Apply cancelled.");
        return Ok(());
    }

    let mut report = ApplyReport::default();
    for driver in &drivers {
        info!("Reconciling {} {}", driver.kind(), driver.name());
        match driver.ensure(&reconciler).await {
            Ok(outcome) => report.results.push(resource_result(driver.as_ref(), &outcome)),
            Err(e) => {
                error!("Failed to reconcile {} {}: {e}", driver.kind(), driver.name());
                report.results.push(ResourceResult {
                    kind: driver.kind().to_string(),
                    name: driver.name().to_string(),
                    action: ResourceAction::Failed,
                    steps: Vec::new(),
                    error: Some(e.to_string()),
                });
                if !continue_on_error {
                    break;
                }
            }
        }
    }

    eprintln!("{}", formatter.format_apply(&report));

    if report.success() {
        Ok(())
    } else {
        Err(WildsyncError::Reconcile(ReconcileError::Aborted {
            reason: format!(
                "{} resource(s) failed to reconcile",
                report.count(ResourceAction::Failed)
            ),
        }))
    }
}

/// Show per-resource existence and drift.
async fn cmd_status(config_path: Option<&PathBuf>, formatter: &OutputFormatter) -> Result<()> {
    let (config, _) = load_config(config_path)?;
    let transport = build_transport(&config);
    let reconciler: Reconciler<'_, dyn Transport> = Reconciler::new(&transport);
    let drivers = build_resources(&config)?;

    let mut report = StatusReport::default();
    for driver in &drivers {
        let exists = driver.exists(&reconciler).await?;
        let pending = driver.plan(&reconciler).await?;
        report.rows.push(ResourceStatus {
            kind: driver.kind().to_string(),
            name: driver.name().to_string(),
            location: driver.describe(),
            exists,
            pending_steps: pending.len(),
        });
    }

    eprintln!("{}", formatter.format_status(&report));

    Ok(())
}

/// Remove one named resource.
async fn cmd_remove(
    config_path: Option<&PathBuf>,
    name: &str,
    auto_approve: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (config, _) = load_config(config_path)?;
    let transport = build_transport(&config);
    let reconciler: Reconciler<'_, dyn Transport> = Reconciler::new(&transport);
    let drivers = build_resources(&config)?;

    let driver = drivers
        .iter()
        .find(|d| d.name() == name)
        .ok_or_else(|| {
            WildsyncError::Config(ConfigError::UnknownResource {
                name: name.to_string(),
            })
        })?;

    eprintln!(
        "This will remove {} '{}' at {}.",
        driver.kind(),
        driver.name(),
        driver.describe()
    );
    if !auto_approve && !confirm("Continue? [y/N]: ")? {
        eprintln!("Remove cancelled.");
        return Ok(());
    }

    let outcome = driver.remove(&reconciler).await?;
    let mut report = ApplyReport::default();
    report.results.push(ResourceResult {
        kind: driver.kind().to_string(),
        name: driver.name().to_string(),
        action: if outcome.changed {
            ResourceAction::Removed
        } else {
            ResourceAction::Unchanged
        },
        steps: outcome.commands.iter().map(Into::into).collect(),
        error: None,
    });
    eprintln!("{}", formatter.format_apply(&report));

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads, overrides, and validates the configuration.
fn load_config(
    config_path: Option<&PathBuf>,
) -> Result<(SyncConfig, wildsync::config::ValidationResult)> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(
        config_file
            .parent()
            .unwrap_or_else(|| std::path::Path::new(".")),
    );
    parser.load_dotenv()?;

    let config = parser.load_with_env(&config_file)?;

    let validator = ConfigValidator::new();
    let result = validator.validate(&config)?;

    Ok((config, result))
}

/// Builds the management CLI transport from configuration.
fn build_transport(config: &SyncConfig) -> JBossCli {
    JBossCli::new(&config.server.jboss_home)
        .with_cli_path(&config.server.cli_path)
        .with_timeout(Duration::from_secs(config.server.timeout_secs))
}

/// Builds the resource driver list, resolving secret references.
fn build_resources(config: &SyncConfig) -> Result<Vec<Box<dyn Resource>>> {
    let backend = SecretBackend::parse(&config.secrets.backend)?;
    let path = config
        .secrets
        .path
        .clone()
        .unwrap_or_else(|| String::from("secrets"));
    let secrets = SecretStore::new(backend, path);
    resources::from_config(config, &secrets)
}

/// Computes the dry-run plan for every resource, in apply order.
async fn compute_plan(
    drivers: &[Box<dyn Resource>],
    reconciler: &Reconciler<'_, dyn Transport>,
) -> Result<PlanReport> {
    let mut report = PlanReport::default();
    for driver in drivers {
        let steps = driver.plan(reconciler).await?;
        report.entries.push(PlanEntry {
            kind: driver.kind().to_string(),
            name: driver.name().to_string(),
            location: driver.describe(),
            steps: steps.iter().map(Into::into).collect(),
        });
    }
    Ok(report)
}

/// Builds an apply result from a successful ensure outcome.
fn resource_result(driver: &dyn Resource, outcome: &ReconcileOutcome) -> ResourceResult {
    ResourceResult {
        kind: driver.kind().to_string(),
        name: driver.name().to_string(),
        action: ResourceAction::from_outcome(outcome),
        steps: outcome.commands.iter().map(Into::into).collect(),
        error: None,
    }
}

/// Asks the user a yes/no question on stderr.
fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
