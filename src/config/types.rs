//! Configuration types and CLI options.
//!
//! This module defines the programmatic tracker configuration and the enums
//! and structs used for command-line argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Rate-limiter windows and thresholds used by the sub-trackers.
#[derive(Debug, Clone)]
pub struct Timings {
    pub scroll_throttle: Duration,
    pub scroll_debounce: Duration,
    pub click_debounce: Duration,
    pub rage_window: Duration,
    pub rage_threshold: u32,
    /// Grid cell size in document percent.
    pub rage_cell_percent: f64,
    pub attention_dwell: Duration,
    /// Intersection ratio at or above which a target counts as visible.
    pub visibility_threshold: f64,
    pub rescan_debounce: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            scroll_throttle: SCROLL_THROTTLE,
            scroll_debounce: SCROLL_DEBOUNCE,
            click_debounce: CLICK_DEBOUNCE,
            rage_window: RAGE_CLICK_WINDOW,
            rage_threshold: RAGE_CLICK_THRESHOLD,
            rage_cell_percent: RAGE_CLICK_CELL_PERCENT,
            attention_dwell: ATTENTION_DWELL,
            visibility_threshold: VISIBILITY_THRESHOLD,
            rescan_debounce: RESCAN_DEBOUNCE,
        }
    }
}

/// Interaction tracker configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use blogish::TrackerConfig;
///
/// let config = TrackerConfig {
///     post_id: "p1".to_string(),
///     enabled: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Post being viewed; sent with every observation
    pub post_id: String,

    /// Master switch; a disabled tracker never emits
    pub enabled: bool,

    /// Base URL the endpoint paths are joined onto
    pub collector_base_url: String,

    /// Regex the page path must match for the tracker to attach
    pub route_pattern: String,

    /// Class identifying the content container when no `<article>` encloses a click
    pub content_class: String,

    /// Per-request timeout for collector calls in seconds
    pub timeout_seconds: u64,

    /// User-Agent sent with every payload
    pub user_agent: String,

    /// Rate-limiter and threshold settings
    pub timings: Timings,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            post_id: String::new(),
            enabled: true,
            collector_base_url: DEFAULT_COLLECTOR_BASE_URL.to_string(),
            route_pattern: DEFAULT_ROUTE_PATTERN.to_string(),
            content_class: DEFAULT_CONTENT_CLASS.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timings: Timings::default(),
        }
    }
}

/// Command-line options for the `blogish` binary.
#[derive(Debug, Parser)]
#[command(
    name = "blogish",
    version,
    about = "Rewrite post HTML into renderable markup and replay heatmap interaction streams"
)]
pub struct Opt {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value = "plain", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// `blogish` subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rewrite stored post HTML and print the embeds found as JSON
    Process {
        /// HTML file to read, or `-` for stdin
        file: PathBuf,

        /// Post identifier used to scope placeholder ids
        #[arg(long)]
        post_id: Option<String>,

        /// Color applied to videos whose URL carries no `primaryColor`
        #[arg(long)]
        fallback_color: Option<String>,
    },

    /// Replay a JSON-lines stream of page events through a live tracker
    Track {
        /// Post being viewed
        #[arg(long)]
        post_id: String,

        /// Full URL of the viewed page (route matching uses its path)
        #[arg(long)]
        page_url: String,

        /// JSON-lines event file, or `-` for stdin
        #[arg(long, default_value = "-")]
        events: PathBuf,

        /// Collector base URL
        #[arg(long, env = "BLOGISH_COLLECTOR_URL", default_value = DEFAULT_COLLECTOR_BASE_URL)]
        collector_url: String,

        /// Rendered post HTML scanned for sections and CTAs when tracking starts
        #[arg(long)]
        content: Option<PathBuf>,

        /// File used to persist the visitor session id between runs
        #[arg(long)]
        session_file: Option<PathBuf>,

        /// Initial viewport width in CSS pixels
        #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
        viewport_width: u32,

        /// Initial viewport height in CSS pixels
        #[arg(long, default_value_t = DEFAULT_VIEWPORT_HEIGHT)]
        viewport_height: u32,

        /// Document height when the page opened; a page shorter than the
        /// viewport is reported as fully viewed
        #[arg(long)]
        document_height: Option<f64>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_seconds: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_tracker_config_defaults() {
        let config = TrackerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.content_class, "post-content");
        assert_eq!(config.timings.scroll_throttle, Duration::from_millis(100));
        assert_eq!(config.timings.click_debounce, Duration::from_millis(1000));
        assert_eq!(config.timings.rage_threshold, 3);
    }

    #[test]
    fn test_opt_parses_process_command() {
        let opt = Opt::try_parse_from([
            "blogish",
            "process",
            "post.html",
            "--post-id",
            "p1",
            "--fallback-color",
            "#112233",
        ])
        .expect("process args should parse");
        match opt.command {
            Command::Process {
                file,
                post_id,
                fallback_color,
            } => {
                assert_eq!(file, PathBuf::from("post.html"));
                assert_eq!(post_id.as_deref(), Some("p1"));
                assert_eq!(fallback_color.as_deref(), Some("#112233"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_opt_parses_track_command_with_global_flags() {
        let opt = Opt::try_parse_from([
            "blogish",
            "track",
            "--post-id",
            "p1",
            "--page-url",
            "https://blogish.app/p/hello",
            "--log-format",
            "json",
        ])
        .expect("track args should parse");
        assert!(matches!(opt.log_format, LogFormat::Json));
        match opt.command {
            Command::Track {
                events,
                viewport_width,
                viewport_height,
                content,
                ..
            } => {
                assert_eq!(events, PathBuf::from("-"));
                assert_eq!((viewport_width, viewport_height), (1280, 800));
                assert!(content.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
