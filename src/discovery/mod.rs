//! Address discovery
//!
//! This module reads candidate addresses, one per line, from any
//! async reader. Blank lines are skipped; validation happens later.

pub mod source;

// Re-export commonly used items
pub use source::{SourceLine, address_lines, read_addresses};
