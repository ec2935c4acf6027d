//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::constants::{
    CONFIG_FILE_NAME, DEFAULT_USER_AGENT, concurrency, output_formats, pool, timeouts,
};
use crate::core::error::{HealthCheckError, Result};

/// What to do with an address the validator rejects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InvalidAddressPolicy {
    /// Report the line and keep probing the others
    #[default]
    Skip,
    /// Fail the run before any probe starts
    Abort,
}

/// How results reach the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Emit each result as soon as its probe completes
    #[default]
    Stream,
    /// Emit all results in input order at the end
    Batch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of probes in flight
    pub concurrency: Option<usize>,

    /// Per-probe timeout in seconds
    pub timeout: Option<u64>,

    /// Client-level timeout in seconds
    pub client_timeout: Option<u64>,

    /// Idle connections kept across all hosts
    pub max_idle_connections: Option<usize>,

    /// Idle connections kept per host
    pub max_idle_per_host: Option<usize>,

    /// Idle connection lifetime in seconds
    pub idle_timeout: Option<u64>,

    /// Custom User-Agent header
    pub user_agent: Option<String>,

    /// Policy for rejected addresses (skip, abort)
    pub on_invalid: Option<InvalidAddressPolicy>,

    /// Result emission mode (stream, batch)
    pub mode: Option<RunMode>,

    /// Output format (text, json, minimal)
    pub output_format: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: Some(concurrency::DEFAULT_LIMIT),
            timeout: Some(timeouts::DEFAULT_PROBE_TIMEOUT_SECONDS),
            client_timeout: Some(timeouts::DEFAULT_CLIENT_TIMEOUT_SECONDS),
            max_idle_connections: Some(pool::DEFAULT_MAX_IDLE),
            max_idle_per_host: Some(pool::DEFAULT_MAX_IDLE_PER_HOST),
            idle_timeout: Some(timeouts::DEFAULT_IDLE_TIMEOUT_SECONDS),
            user_agent: None, // Falls back to DEFAULT_USER_AGENT
            on_invalid: Some(InvalidAddressPolicy::Skip),
            mode: Some(RunMode::Stream),
            output_format: Some(output_formats::DEFAULT.to_string()),
            verbose: Some(false),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HealthCheckError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            HealthCheckError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        if let Ok(config) = Self::load_from_file(CONFIG_FILE_NAME) {
            return config;
        }

        // Parent directories, up to 3 levels
        for i in 1..=3 {
            let path = format!("{}{}", "../".repeat(i), CONFIG_FILE_NAME);
            if let Ok(config) = Self::load_from_file(&path) {
                return config;
            }
        }

        Self::default()
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Engine
        if let Some(concurrency) = cli_config.concurrency {
            self.concurrency = Some(concurrency);
        }
        if let Some(timeout) = cli_config.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(client_timeout) = cli_config.client_timeout {
            self.client_timeout = Some(client_timeout);
        }

        // Network
        if let Some(ref user_agent) = cli_config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }

        // Behavior
        if let Some(policy) = cli_config.on_invalid {
            self.on_invalid = Some(policy);
        }
        if let Some(mode) = cli_config.mode {
            self.mode = Some(mode);
        }

        // Output & format
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
        if cli_config.verbose {
            self.verbose = Some(true);
        }
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency.unwrap_or(concurrency::DEFAULT_LIMIT)
    }

    /// Get the per-probe timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(
            self.timeout
                .unwrap_or(timeouts::DEFAULT_PROBE_TIMEOUT_SECONDS),
        )
    }

    /// Get the client-level timeout as Duration
    pub fn client_timeout_duration(&self) -> Duration {
        Duration::from_secs(
            self.client_timeout
                .unwrap_or(timeouts::DEFAULT_CLIENT_TIMEOUT_SECONDS),
        )
    }

    /// Get the idle connection lifetime as Duration
    pub fn idle_timeout_duration(&self) -> Duration {
        Duration::from_secs(
            self.idle_timeout
                .unwrap_or(timeouts::DEFAULT_IDLE_TIMEOUT_SECONDS),
        )
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn invalid_policy(&self) -> InvalidAddressPolicy {
        self.on_invalid.unwrap_or_default()
    }

    pub fn run_mode(&self) -> RunMode {
        self.mode.unwrap_or_default()
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(output_formats::DEFAULT)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.concurrency {
            if limit == 0 {
                return Err(HealthCheckError::Config(
                    "Concurrency cannot be 0. Expected a positive integer.".to_string(),
                ));
            }
            if limit > concurrency::MAX_LIMIT {
                return Err(HealthCheckError::Config(format!(
                    "Concurrency of {limit} is extremely high and may exhaust file descriptors. Expected at most {}.",
                    concurrency::MAX_LIMIT
                )));
            }
        }

        for (name, value) in [
            ("Timeout", self.timeout),
            ("Client timeout", self.client_timeout),
            ("Idle timeout", self.idle_timeout),
        ] {
            if let Some(seconds) = value {
                if seconds == 0 {
                    return Err(HealthCheckError::Config(format!(
                        "{name} cannot be 0. Expected a positive integer representing seconds."
                    )));
                }
                if seconds > timeouts::MAX_TIMEOUT_SECONDS {
                    return Err(HealthCheckError::Config(format!(
                        "{name} of {seconds} seconds is larger than the maximum of {} seconds.",
                        timeouts::MAX_TIMEOUT_SECONDS
                    )));
                }
            }
        }

        if let (Some(per_host), Some(total)) = (self.max_idle_per_host, self.max_idle_connections)
            && per_host > total
        {
            return Err(HealthCheckError::Config(format!(
                "Idle connections per host ({per_host}) cannot exceed the total idle connections ({total})."
            )));
        }

        if let Some(ref user_agent) = self.user_agent
            && user_agent.trim().is_empty()
        {
            return Err(HealthCheckError::Config(
                "User agent cannot be empty.".to_string(),
            ));
        }

        if let Some(ref format) = self.output_format
            && !output_formats::ALL.contains(&format.as_str())
        {
            return Err(HealthCheckError::Config(format!(
                "Invalid output format '{format}'. Expected one of: {}.",
                output_formats::ALL.join(", ")
            )));
        }

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Engine
    pub concurrency: Option<usize>,    // --concurrency
    pub timeout: Option<u64>,          // --timeout
    pub client_timeout: Option<u64>,   // --client-timeout

    // Network
    pub user_agent: Option<String>, // --user-agent

    // Behavior
    pub on_invalid: Option<InvalidAddressPolicy>, // --on-invalid
    pub mode: Option<RunMode>,                    // --mode

    // Output & format
    pub quiet: bool,                   // --quiet
    pub verbose: bool,                 // --verbose
    pub output_format: Option<String>, // --format

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
