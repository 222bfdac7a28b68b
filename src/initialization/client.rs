//! HTTP client initialization.
//!
//! This module provides the function that builds the client used for
//! collector emission.

use std::sync::Arc;
use std::time::Duration;

use crate::config::TrackerConfig;
use reqwest::ClientBuilder;

/// Initializes the collector HTTP client.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the tracker configuration
/// - Per-request timeout from the tracker configuration
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &TrackerConfig) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
