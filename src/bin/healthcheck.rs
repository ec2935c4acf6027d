use clap::Parser;
use healthcheck::config::{CliConfig, Config};
use healthcheck::core::constants::exit_codes;
use healthcheck::core::{HealthCheckError, Result};
use healthcheck::pipeline::{self, RunSummary};
use healthcheck::probe::ProbeEngine;
use healthcheck::reporting::logging;
use healthcheck::ui::{Cli, ResultSink, cli_to_config};
use healthcheck::validation::{ExecutionContext, validate_execution};

use log::warn;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run_healthcheck(&cli).await {
        Ok(_) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            match &e {
                // Usage problems are printed as they are
                HealthCheckError::MissingInput | HealthCheckError::InputUnreadable { .. } => {
                    eprintln!("{e}")
                }
                _ => eprintln!("Error: {e}"),
            }
            std::process::exit(exit_codes::ERROR);
        }
    }
}

/// Main run logic extracted from main() for testing
pub async fn run_healthcheck(cli: &Cli) -> Result<RunSummary> {
    validate_execution(&ExecutionContext::current())?;
    let path = cli.file.clone().ok_or(HealthCheckError::MissingInput)?;

    let cli_config = cli_to_config(cli);
    let config = load_and_merge_config(&cli_config)?;
    logging::init_logger(config.verbose.unwrap_or(false), cli_config.quiet);
    logging::log_config_info(&config);

    let mut sink = ResultSink::new(std::io::stdout(), config.output_format());
    sink.opening(&path)?;

    let source = tokio::fs::File::open(&path)
        .await
        .map_err(|source| HealthCheckError::InputUnreadable {
            path: path.clone(),
            source,
        })?;

    let engine = ProbeEngine::from_config(&config)?;
    let cancel = CancellationToken::new();
    watch_for_interrupt(cancel.clone());

    logging::log_run_start(&path);
    let started = Instant::now();
    let summary = pipeline::run(&engine, source, &mut sink, &config, &cancel).await?;
    logging::log_run_complete(&summary, started.elapsed());

    Ok(summary)
}

/// Load configuration from file or standard locations and merge with CLI config
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    config.validate()?;
    Ok(config)
}

/// Ctrl-C stops admission; probes already in flight still report.
fn watch_for_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, waiting for in-flight probes");
            cancel.cancel();
        }
    });
}
