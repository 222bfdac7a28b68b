//! Runners behind the `process` and `track` subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use crate::app::replay::{open_event_source, replay_events, ReplaySummary};
use crate::config::TrackerConfig;
use crate::content::{process_content, ProcessOptions, ProcessedContent};
use crate::error_handling::{InfoType, ProcessingStats};
use crate::initialization::init_client;
use crate::tracker::{
    FileSessionStore, HttpTransport, MemorySessionStore, PageInfo, SessionStore, Tracker, Viewport,
};

/// Reads a whole input: `-` is stdin, anything else a file.
pub async fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Rewrites the post HTML in `file`.
pub async fn run_process(
    file: &Path,
    options: &ProcessOptions,
    stats: &ProcessingStats,
) -> Result<ProcessedContent> {
    let html = read_input(file).await?;
    let processed = process_content(&html, options, stats);
    info!(
        "Rewrote post content: {} video(s), {} button(s)",
        processed.videos.len(),
        processed.buttons.len()
    );
    Ok(processed)
}

/// Page view to replay with the `track` command.
#[derive(Debug, Clone)]
pub struct TrackOptions {
    pub page_url: String,
    pub viewport: Viewport,
    /// Document height when the page was opened
    pub document_height: Option<f64>,
    /// JSON-lines event stream, `-` for stdin
    pub events: PathBuf,
    /// Rendered post HTML for initial section and CTA discovery
    pub content: Option<PathBuf>,
    pub session_file: Option<PathBuf>,
}

/// Results of a `track` run.
#[derive(Debug, Clone)]
pub struct TrackReport {
    pub replay: ReplaySummary,
    /// Whether the page matched the post route and tracking was enabled
    pub tracked: bool,
    pub emitted: usize,
    pub failed: usize,
    pub elapsed_seconds: f64,
    pub stats: Arc<ProcessingStats>,
}

/// Replays a recorded page view against the configured collector.
///
/// # Errors
///
/// Fails if the HTTP client or tracker cannot be built, or if the event or
/// content input cannot be read. Collector failures are only counted.
pub async fn run_track(
    config: TrackerConfig,
    options: TrackOptions,
    cancel: CancellationToken,
) -> Result<TrackReport> {
    let start_time = std::time::Instant::now();

    let client = init_client(&config).context("Failed to initialize HTTP client")?;
    let transport = Arc::new(HttpTransport::new(client, &config.collector_base_url));
    info!("Sending observations to {}", config.collector_base_url);
    let tracker = Tracker::new(config, transport).context("Failed to initialize tracker")?;

    let sessions: Box<dyn SessionStore> = match &options.session_file {
        Some(path) => Box::new(FileSessionStore::new(path)),
        None => Box::new(MemorySessionStore::new()),
    };

    let content_html = match &options.content {
        Some(path) => Some(read_input(path).await?),
        None => None,
    };

    let handle = tracker.start(
        PageInfo {
            url: options.page_url.clone(),
            viewport: options.viewport,
            document_height: options.document_height,
            content_html,
        },
        sessions.as_ref(),
    );
    let tracked = handle.is_active();
    if !tracked {
        warn!(
            "{} is not a trackable post page; events will be dropped",
            options.page_url
        );
    }

    let source = open_event_source(&options.events).await?;
    let replay = replay_events(&handle, source, &cancel).await;
    let stats = handle.stats();
    // Flush even if the stream broke off midway
    handle.stop().await;
    let replay = replay?;

    Ok(TrackReport {
        replay,
        tracked,
        emitted: stats.get_info_count(InfoType::EmitSucceeded),
        failed: stats.total_errors(),
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_run_process_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"<iframe src="https://iframe.videodelivery.net/abc123"></iframe>"#
        )
        .unwrap();

        let stats = ProcessingStats::new();
        let options = ProcessOptions {
            post_id: Some("p1".to_string()),
            fallback_color: None,
        };
        let processed = run_process(file.path(), &options, &stats).await.unwrap();
        assert_eq!(processed.videos.len(), 1);
        assert_eq!(processed.videos[0].video_id, "abc123");
    }

    #[tokio::test]
    async fn test_run_process_missing_file_is_an_error() {
        let stats = ProcessingStats::new();
        let result = run_process(
            Path::new("/nonexistent/post.html"),
            &ProcessOptions::default(),
            &stats,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_track_report_for_off_route_page() {
        let events = NamedTempFile::new().unwrap();
        let config = TrackerConfig {
            post_id: "p1".to_string(),
            ..Default::default()
        };
        let options = TrackOptions {
            page_url: "https://blogish.app/about".to_string(),
            viewport: Viewport::new(800, 600),
            document_height: None,
            events: events.path().to_path_buf(),
            content: None,
            session_file: None,
        };
        let report = run_track(config, options, CancellationToken::new())
            .await
            .unwrap();
        assert!(!report.tracked);
        assert_eq!(report.emitted, 0);
        assert!(format!("{:?}", report).contains("tracked: false"));
    }
}
