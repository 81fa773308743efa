//! cache-provision - Distributed cache provisioning tool
//!
//! Entry point for the cache-provision application.

use cache_provision::cli::{Cli, Commands, ConfigCommands, CreateArgs};
use cache_provision::config::{Config, LogFormat, LogOutput, LoggingConfig};
use cache_provision::document::DocumentFileParser;
use cache_provision::error::exit_code;
use cache_provision::provision::{self, DeployOptions, DeploymentCoordinator};
use cache_provision::remote::{FileMappingSynchronizer, HttpNodeConnector};
use cache_provision::ProvisionError;
use clap::Parser;
use std::process::ExitCode;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging settings come from the configuration file, so load it first.
    let config = Config::load(cli.config.as_deref());
    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();

    if let Err(e) = init_logging(&cli, &logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(exit_code::GENERAL_ERROR as u8);
    }

    match run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = %e.code(), "{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over everything; `-v`/`-q` win over the configured level.
fn init_logging(
    cli: &Cli,
    logging: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = if cli.quiet || cli.verbose > 0 {
        cli.log_level().0.to_string()
    } else {
        logging.level.as_str().to_string()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(logging.with_target);

    match (logging.format, logging.output) {
        (LogFormat::Json, LogOutput::Stdout) => {
            builder.json().with_writer(std::io::stdout).try_init()
        }
        (LogFormat::Json, LogOutput::Stderr) => {
            builder.json().with_writer(std::io::stderr).try_init()
        }
        (LogFormat::Text, LogOutput::Stdout) => builder.with_writer(std::io::stdout).try_init(),
        (LogFormat::Text, LogOutput::Stderr) => builder.with_writer(std::io::stderr).try_init(),
    }
}

/// Main application logic.
fn run(cli: &Cli, config: cache_provision::Result<Config>) -> cache_provision::Result<()> {
    match &cli.command {
        Commands::Create(args) => cmd_create(config?, args),
        Commands::Config(subcmd) => cmd_config(config, subcmd),
    }
}

/// Handle the `create` command.
fn cmd_create(mut config: Config, args: &CreateArgs) -> cache_provision::Result<()> {
    if let Some(port) = args.port {
        config.management.port = port;
    }

    let run_id = uuid::Uuid::new_v4();
    let (request, document) = provision::prepare(args.to_params(), &DocumentFileParser)?;

    if args.dry_run {
        let yaml = serde_yaml::to_string(&document).map_err(|e| {
            ProvisionError::config_with_source("Failed to serialize cache configuration", e)
        })?;
        println!("{}", yaml);
        return Ok(());
    }

    tracing::info!(
        run_id = %run_id,
        cache = %document.name,
        topology = %document.topology.kind,
        servers = request.targets.len(),
        overwrite = request.params.overwrite,
        "Provisioning cache"
    );

    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        ProvisionError::config_with_source("Failed to create async runtime", e)
    })?;

    let connector = HttpNodeConnector::new(config.management.clone());
    let synchronizer = FileMappingSynchronizer::new(&config.mapping.path);
    let options = DeployOptions::new(&config, &request);
    let coordinator = DeploymentCoordinator::new(&connector, &synchronizer, options);

    let span = tracing::info_span!("provision", run_id = %run_id, cache = %document.name);
    let report = runtime.block_on(
        async { coordinator.deploy(&document, &request.targets).await }.instrument(span),
    )?;

    for address in report.accepted() {
        println!("Cache '{}' successfully created on server {}", report.cache, address);
    }

    Ok(())
}

/// Handle the `config` subcommand.
fn cmd_config(
    config: cache_provision::Result<Config>,
    subcmd: &ConfigCommands,
) -> cache_provision::Result<()> {
    match subcmd {
        ConfigCommands::Validate => match config {
            Ok(config) => {
                println!("✓ Configuration is valid");
                tracing::debug!(?config, "Validated configuration");
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid: {}", e);
                Err(e)
            }
        },
        ConfigCommands::Show => {
            let yaml = serde_yaml::to_string(&config?).map_err(|e| {
                ProvisionError::config_with_source("Failed to serialize configuration", e)
            })?;
            println!("{}", yaml);
            Ok(())
        }
    }
}
