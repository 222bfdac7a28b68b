//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timings, thresholds, endpoints, reserved markup)
//! - Tracker configuration
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Command, LogFormat, LogLevel, Opt, Timings, TrackerConfig};
