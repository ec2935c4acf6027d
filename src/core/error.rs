use std::fmt;

/// Errors that abort a whole run.
///
/// Per-address failures are never represented here: they travel inside a
/// [`ProbeResult`](crate::core::types::ProbeResult) instead.
#[derive(Debug)]
pub enum HealthCheckError {
    /// IO error (opening or reading the address source, writing the sink)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// An address was rejected while the abort policy is active
    InvalidAddress { line: usize, address: String },

    /// HTTP client construction error
    Http(reqwest::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// The address source could not be opened
    InputUnreadable { path: String, source: std::io::Error },

    /// No address source was given
    MissingInput,

    /// The process runs with borrowed privileges
    ExecutionDenied(String),
}

impl fmt::Display for HealthCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthCheckError::Io(err) => write!(f, "{err}"),
            HealthCheckError::Config(msg) => write!(f, "Configuration error: {msg}"),
            HealthCheckError::InvalidAddress { line, address } => write!(
                f,
                "Line {line}: Invalid URL: {address} ({})",
                crate::core::constants::error_messages::ONLY_HTTP_ALLOWED
            ),
            HealthCheckError::Http(err) => write!(f, "HTTP client error: {err}"),
            HealthCheckError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            HealthCheckError::InputUnreadable { path, source } => {
                write!(f, "open {path}: {source}")
            }
            HealthCheckError::MissingInput => write!(
                f,
                "{}",
                crate::core::constants::error_messages::MISSING_FILE_ARGUMENT
            ),
            HealthCheckError::ExecutionDenied(reason) => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for HealthCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HealthCheckError::Io(err) => Some(err),
            HealthCheckError::InputUnreadable { source, .. } => Some(source),
            HealthCheckError::Http(err) => Some(err),
            HealthCheckError::TomlParsing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HealthCheckError {
    fn from(err: std::io::Error) -> Self {
        HealthCheckError::Io(err)
    }
}

impl From<reqwest::Error> for HealthCheckError {
    fn from(err: reqwest::Error) -> Self {
        HealthCheckError::Http(err)
    }
}

impl From<toml::de::Error> for HealthCheckError {
    fn from(err: toml::de::Error) -> Self {
        HealthCheckError::TomlParsing(err)
    }
}

/// Type alias for Results using HealthCheckError
pub type Result<T> = std::result::Result<T, HealthCheckError>;
