// Command-line interface definitions for healthcheck

use crate::config::{CliConfig, InvalidAddressPolicy, RunMode};
use crate::core::constants::output_formats;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Check whether HTTP/HTTPS services are up", long_about = None)]
pub struct Cli {
    /// File with one address per line
    pub file: Option<String>,

    // Engine
    /// Maximum probes in flight (default: 64)
    #[arg(short = 'c', long, value_name = "COUNT", help_heading = "Engine")]
    pub concurrency: Option<usize>,

    /// Per-probe timeout in seconds (default: 5)
    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        help_heading = "Engine"
    )]
    pub timeout: Option<u64>,

    /// Overall client timeout in seconds (default: 30)
    #[arg(long, value_name = "SECONDS", help_heading = "Engine")]
    pub client_timeout: Option<u64>,

    /// Emit results as they complete, or all at once in input order
    #[arg(long, value_enum, value_name = "MODE", help_heading = "Engine")]
    pub mode: Option<RunMode>,

    /// What to do with lines that are not HTTP/HTTPS addresses
    #[arg(long, value_enum, value_name = "POLICY", help_heading = "Engine")]
    pub on_invalid: Option<InvalidAddressPolicy>,

    // Network
    /// Custom User-Agent header
    #[arg(long, value_name = "AGENT", help_heading = "Network")]
    pub user_agent: Option<String>,

    // Output & Verbosity
    /// Suppress log output
    #[arg(short = 'q', long, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Output format (default: text)
    #[arg(long, value_name = "FORMAT", value_parser = output_formats::ALL, help_heading = "Output & Verbosity")]
    pub format: Option<String>,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,
}

/// Convert derive-based CLI arguments directly to CliConfig structure
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    CliConfig {
        concurrency: cli.concurrency,
        timeout: cli.timeout,
        client_timeout: cli.client_timeout,
        user_agent: cli
            .user_agent
            .as_deref()
            .map(str::trim)
            .filter(|agent| !agent.is_empty())
            .map(str::to_string),
        on_invalid: cli.on_invalid,
        mode: cli.mode,
        quiet: cli.quiet,
        verbose: cli.verbose,
        output_format: cli.format.clone(),
        config_file: cli.config.clone(),
        no_config: cli.no_config,
    }
}
