//! Application-wide constants to avoid magic values throughout the codebase.
//!
//! This module centralizes the defaults of the probe engine and the literal
//! strings used by the CLI and the result sink.

/// Output format constants
pub mod output_formats {
    /// Text output format - one `Url: ...` line per result
    pub const TEXT: &str = "text";
    /// JSON output format - one JSON object per line for automation
    pub const JSON: &str = "json";
    /// Minimal output format - status code (or ERR) followed by the address
    pub const MINIMAL: &str = "minimal";

    /// Default output format
    pub const DEFAULT: &str = TEXT;

    /// All valid output formats
    pub const ALL: [&str; 3] = [TEXT, JSON, MINIMAL];
}

/// Concurrency constants
pub mod concurrency {
    /// Default number of probes allowed in flight at once
    pub const DEFAULT_LIMIT: usize = 64;
    /// Upper bound accepted by configuration validation
    pub const MAX_LIMIT: usize = 10_000;
}

/// Timeout and duration constants
pub mod timeouts {
    /// Default per-probe timeout in seconds
    pub const DEFAULT_PROBE_TIMEOUT_SECONDS: u64 = 5;
    /// Default client-level timeout in seconds
    pub const DEFAULT_CLIENT_TIMEOUT_SECONDS: u64 = 30;
    /// Default idle connection lifetime in seconds
    pub const DEFAULT_IDLE_TIMEOUT_SECONDS: u64 = 90;
    /// Maximum reasonable timeout in seconds (1 hour)
    pub const MAX_TIMEOUT_SECONDS: u64 = 3600;
}

/// Connection pool constants
pub mod pool {
    /// Default cap on idle connections across all hosts
    pub const DEFAULT_MAX_IDLE: usize = 256;
    /// Default cap on idle connections per host
    pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 64;
    /// Redirect hops followed before a probe fails
    pub const MAX_REDIRECTS: usize = 10;
}

/// Address scheme constants
pub mod schemes {
    pub const HTTP: &str = "http://";
    pub const HTTPS: &str = "https://";
}

/// Default identifying header value sent with every probe
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Default config file name looked up in the current and parent directories
pub const CONFIG_FILE_NAME: &str = ".healthcheck.toml";

/// Process exit codes
pub mod exit_codes {
    /// The run completed, even when individual probes failed
    pub const SUCCESS: i32 = 0;
    /// Setup failure, nothing (or not everything) was probed
    pub const ERROR: i32 = 1;
}

/// Error message constants
pub mod error_messages {
    pub const MISSING_FILE_ARGUMENT: &str = "missing file argument";
    pub const ONLY_HTTP_ALLOWED: &str = "only HTTP/HTTPS allowed";
    pub const TIMED_OUT: &str = "request timed out";
    pub const CANCELLED: &str = "probe cancelled before admission";
    pub const SETUID_DENIED: &str = "SUID/SGID execution denied";
    pub const SUDO_DENIED: &str = "sudo execution denied";
}
