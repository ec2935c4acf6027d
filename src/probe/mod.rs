//! Probe engine
//!
//! This module turns addresses into probe results while holding at most a
//! fixed number of requests in flight, either as an order-preserving batch
//! or as a completion-ordered stream.

pub mod engine;
pub mod stream;
pub mod transport;

// Re-export commonly used items
pub use engine::ProbeEngine;
pub use stream::ProbeStream;
pub use transport::{Probe, Transport};
