//! User interface
//!
//! This module contains the CLI definition and the result sink that
//! renders probe results for the terminal or for other programs.

pub mod cli;
pub mod output;

// Re-export commonly used items
pub use cli::{Cli, cli_to_config};
pub use output::{ResultSink, format_latency};
