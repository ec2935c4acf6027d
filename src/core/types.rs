use std::fmt;
use std::time::Duration;

use crate::core::constants::error_messages;
use crate::validation::InvalidAddress;

/// Why a single probe failed.
///
/// Probe errors are always local to one address and never abort a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The address was rejected before any network I/O
    InvalidAddress(String),
    /// DNS failure, refused or reset connection
    Connect(String),
    /// The probe exceeded its per-request deadline
    Timeout,
    /// Redirect loop or too many redirects
    Redirect(String),
    /// Any other transport-layer failure
    Transport(String),
    /// The run was cancelled before this address got a token
    Cancelled,
}

impl ProbeError {
    /// Classify a transport error returned by the HTTP client.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let description = describe(err);

        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_builder() {
            ProbeError::InvalidAddress(description)
        } else if err.is_connect() {
            ProbeError::Connect(description)
        } else if err.is_redirect() {
            ProbeError::Redirect(description)
        } else {
            ProbeError::Transport(description)
        }
    }
}

impl From<InvalidAddress> for ProbeError {
    fn from(reason: InvalidAddress) -> Self {
        ProbeError::InvalidAddress(reason.to_string())
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::InvalidAddress(reason) => write!(f, "invalid address: {reason}"),
            ProbeError::Connect(msg) => write!(f, "connection failed: {msg}"),
            ProbeError::Timeout => write!(f, "{}", error_messages::TIMED_OUT),
            ProbeError::Redirect(msg) => write!(f, "redirect failed: {msg}"),
            ProbeError::Transport(msg) => write!(f, "{msg}"),
            ProbeError::Cancelled => write!(f, "{}", error_messages::CANCELLED),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Join an error and its sources into one line.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // hyper and reqwest often repeat the cause inside their own message
        if !description.contains(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        source = cause.source();
    }
    description
}

/// Final state of a probe: exactly one of a status code or an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The remote end answered; any HTTP status counts, including 4xx/5xx
    Status(u16),
    Failed(ProbeError),
}

/// The result of probing one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub address: String,
    pub outcome: ProbeOutcome,
    /// Time from admission (token acquired) to finalisation
    pub latency: Duration,
}

impl ProbeResult {
    /// Create a result for a probe that received a response.
    pub fn succeeded(address: String, status_code: u16, latency: Duration) -> Self {
        Self {
            address,
            outcome: ProbeOutcome::Status(status_code),
            latency,
        }
    }

    /// Create a result for a probe that failed.
    pub fn failed(address: String, error: ProbeError, latency: Duration) -> Self {
        Self {
            address,
            outcome: ProbeOutcome::Failed(error),
            latency,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.outcome {
            ProbeOutcome::Status(code) => Some(code),
            ProbeOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ProbeError> {
        match &self.outcome {
            ProbeOutcome::Status(_) => None,
            ProbeOutcome::Failed(err) => Some(err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Status(_))
    }
}
