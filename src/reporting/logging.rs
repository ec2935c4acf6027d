use crate::config::Config;
use crate::discovery::SourceLine;
use crate::pipeline::RunSummary;
use log::{debug, error, info, warn};
use std::time::Duration;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = log_level(verbose, quiet);

    let initialized = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if initialized.is_ok() {
        debug!("Logger initialized with level: {level:?}");
    }
}

/// Warnings are shown by default; verbose adds the per-probe trace.
pub fn log_level(verbose: bool, quiet: bool) -> log::LevelFilter {
    if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    }
}

/// Log configuration information
pub fn log_config_info(config: &Config) {
    info!(
        "Configuration: concurrency={}, timeout={}s, client_timeout={}s, mode={:?}, on_invalid={:?}",
        config.concurrency_limit(),
        config.timeout_duration().as_secs(),
        config.client_timeout_duration().as_secs(),
        config.run_mode(),
        config.invalid_policy(),
    );
    info!(
        "HTTP: user_agent={}, idle_timeout={}s",
        config.user_agent(),
        config.idle_timeout_duration().as_secs()
    );
}

/// Log the start of a run
pub fn log_run_start(path: &str) {
    info!("Reading addresses from {path}");
}

/// Log an input line that was not probed
pub fn log_skipped_line(line: &SourceLine) {
    warn!(
        "Skipping line {}: {:?} is not an HTTP/HTTPS address",
        line.number, line.address
    );
}

/// Log run completion
pub fn log_run_complete(summary: &RunSummary, elapsed: Duration) {
    let elapsed_ms = elapsed.as_millis();
    if summary.failed == 0 && summary.skipped == 0 {
        info!(
            "✅ Run complete: {}/{} addresses up ({elapsed_ms}ms)",
            summary.succeeded,
            summary.probed()
        );
    } else {
        info!(
            "Run complete: {}/{} addresses up, {} failed, {} skipped ({elapsed_ms}ms)",
            summary.succeeded,
            summary.probed(),
            summary.failed,
            summary.skipped
        );
    }
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_log_level_selection() {
        assert_eq!(log_level(false, false), log::LevelFilter::Warn);
        assert_eq!(log_level(true, false), log::LevelFilter::Debug);
        assert_eq!(log_level(false, true), log::LevelFilter::Off);
        // Quiet wins over verbose
        assert_eq!(log_level(true, true), log::LevelFilter::Off);
    }

    #[test]
    fn test_logger_initialization_is_repeatable() {
        // A second init must not panic even though a logger is installed
        init_logger(true, false);
        init_logger(false, true);
    }

    #[test]
    fn test_log_functions_dont_panic() {
        let config = Config::default();
        log_config_info(&config);
        log_run_start("services.txt");
        log_skipped_line(&SourceLine::new(3, "ftp://example.com"));

        let summary = RunSummary {
            succeeded: 2,
            failed: 1,
            skipped: 1,
            ..Default::default()
        };
        log_run_complete(&summary, Duration::from_millis(120));
        log_run_complete(&RunSummary::default(), Duration::ZERO);

        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        log_error("Reading input failed", Some(&err));
        log_error("Reading input failed", None);
    }
}
