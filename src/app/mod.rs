//! Command-line application layer.
//!
//! This module provides the runners behind the CLI subcommands, page event
//! replay and statistics printing used by the main application.

pub mod commands;
pub mod replay;
pub mod statistics;

// Re-export public API
pub use commands::{read_input, run_process, run_track, TrackOptions, TrackReport};
pub use replay::{open_event_source, parse_event_line, replay_events, ReplaySummary};
pub use statistics::print_error_statistics;
