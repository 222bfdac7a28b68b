//! Shared utilities.
//!
//! This module provides:
//! - CSS selector and regex compilation helpers
//! - Debounce / throttle rate limiters driven by explicit instants

mod rate_limit;
mod selector;

pub use rate_limit::{earliest, Debounce, Throttle};
pub use selector::{compile_regex_unsafe, parse_selector_unsafe};
