//! Page event stream replay.
//!
//! The stream is JSON lines, one `TimedEvent` per line. Blank lines and lines
//! starting with `#` are ignored; malformed lines are logged and skipped.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use crate::tracker::{TimedEvent, TrackerHandle};

/// Counts from one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Events the tracker accepted
    pub dispatched: usize,
    /// Events dropped by an inert tracker
    pub dropped: usize,
    /// Lines that did not parse
    pub malformed: usize,
}

/// Parses one stream line; `None` for blank and comment lines.
pub fn parse_event_line(line: &str) -> Option<Result<TimedEvent, serde_json::Error>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(serde_json::from_str(trimmed))
}

/// Opens the event stream: `-` is stdin, anything else a file.
pub async fn open_event_source(path: &Path) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if path.as_os_str() == "-" {
        info!("Reading page events from stdin");
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open event file {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Feeds the stream into `handle`, honoring each event's `delay_ms`.
///
/// Stops early when `cancel` fires.
pub async fn replay_events<R>(
    handle: &TrackerHandle,
    reader: R,
    cancel: &CancellationToken,
) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ReplaySummary::default();
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Replay interrupted");
                break;
            }
            line = lines.next_line() => line.context("Failed to read event stream")?,
        };
        let Some(line) = line else {
            break;
        };

        let timed = match parse_event_line(&line) {
            None => continue,
            Some(Ok(timed)) => timed,
            Some(Err(e)) => {
                warn!("Skipping malformed event line: {e}");
                summary.malformed += 1;
                continue;
            }
        };

        if timed.delay_ms > 0 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Replay interrupted");
                    break;
                }
                _ = sleep(Duration::from_millis(timed.delay_ms)) => {}
            }
        }

        if handle.dispatch(timed.event) {
            summary.dispatched += 1;
        } else {
            summary.dropped += 1;
        }
    }

    Ok(summary)
}
