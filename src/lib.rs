//! blogish library: post content rewriting and reader interaction tracking
//!
//! This library provides the two halves of a Blogish public post page:
//!
//! - **Content processing**: stored post HTML is rewritten so that provider
//!   video iframes, `<video>` tags and button directives become inert
//!   placeholders, with a typed descriptor for each placeholder so the host
//!   can mount the interactive widget.
//! - **Interaction tracking**: scroll depth, clicks (dead and rage clicks),
//!   section attention and CTA visibility are observed on the live page and
//!   sent, fire-and-forget, to a heatmap collector.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use blogish::{
//!     init_client, HttpTransport, MemorySessionStore, PageEvent, PageInfo, Tracker,
//!     TrackerConfig, Viewport,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackerConfig {
//!     post_id: "p1".to_string(),
//!     ..Default::default()
//! };
//! let client = init_client(&config)?;
//! let transport = Arc::new(HttpTransport::new(client, &config.collector_base_url));
//! let tracker = Tracker::new(config, transport)?;
//!
//! let handle = tracker.start(
//!     PageInfo {
//!         url: "https://blogish.app/p/hello-world".to_string(),
//!         viewport: Viewport::new(1280, 800),
//!         document_height: Some(3200.0),
//!         content_html: None,
//!     },
//!     &MemorySessionStore::new(),
//! );
//! handle.dispatch(PageEvent::Unload);
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Tracking requires a Tokio runtime. Content processing is synchronous.

pub mod app;
pub mod config;
pub mod content;
pub mod error_handling;
pub mod initialization;
pub mod tracker;
mod utils;

// Re-export public API
pub use config::{LogFormat, LogLevel, Timings, TrackerConfig};
pub use content::{
    process_content, ButtonAttrs, ButtonEmbed, EmbedDescriptor, ProcessOptions, ProcessedContent,
    VideoEmbed,
};
pub use error_handling::{EmitError, InitializationError, ProcessingStats, SessionError};
pub use initialization::{init_client, init_logger_with};
pub use tracker::{
    ElementInfo, FileSessionStore, HttpTransport, MemorySessionStore, ObservedTarget, PageEvent,
    PageInfo, SessionStore, Tracker, TrackerHandle, Transport, Viewport,
};
