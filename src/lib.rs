//! Liveness checks for HTTP/HTTPS services.
//!
//! Addresses are read one per line, validated, and probed by a
//! bounded-concurrency engine that either returns every result in input
//! order ([`ProbeEngine::probe_batch`]) or emits each one as it completes
//! ([`ProbeEngine::probe_stream`]).

pub mod config;
pub mod core;
pub mod discovery;
pub mod pipeline;
pub mod probe;
pub mod reporting;
pub mod ui;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, InvalidAddressPolicy, RunMode};
pub use crate::core::{HealthCheckError, ProbeError, ProbeOutcome, ProbeResult, Result};
pub use discovery::SourceLine;
pub use pipeline::RunSummary;
pub use probe::{Probe, ProbeEngine, ProbeStream, Transport};
pub use validation::{InvalidAddress, check_address, is_valid_address};
