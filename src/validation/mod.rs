//! Address validation
//!
//! This module decides which addresses are worth probing and whether the
//! process may run at all. It never touches the network.

pub mod address;
pub mod execution;

// Re-export commonly used items
pub use address::{InvalidAddress, check_address, is_valid_address};
pub use execution::{ExecutionContext, validate_execution};
