//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `blogish` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use blogish::app::{print_error_statistics, run_process, run_track, TrackOptions};
use blogish::config::{Command, Opt};
use blogish::initialization::init_logger_with;
use blogish::{ProcessOptions, ProcessingStats, TrackerConfig, Viewport};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists) so
    // BLOGISH_COLLECTOR_URL can be set there
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(opt.command).await {
        eprintln!("blogish error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Process {
            file,
            post_id,
            fallback_color,
        } => {
            let stats = ProcessingStats::new();
            let options = ProcessOptions {
                post_id,
                fallback_color,
            };
            let processed = run_process(&file, &options, &stats).await?;
            print_error_statistics(&stats);
            let json = serde_json::to_string_pretty(&processed)
                .context("Failed to serialize processed content")?;
            println!("{json}");
        }
        Command::Track {
            post_id,
            page_url,
            events,
            collector_url,
            content,
            session_file,
            viewport_width,
            viewport_height,
            document_height,
            timeout_seconds,
        } => {
            let config = TrackerConfig {
                post_id,
                collector_base_url: collector_url,
                timeout_seconds,
                ..Default::default()
            };
            let options = TrackOptions {
                page_url,
                viewport: Viewport::new(viewport_width, viewport_height),
                document_height,
                events,
                content,
                session_file,
            };

            let cancel = CancellationToken::new();
            let cancel_on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel_on_signal.cancel();
                }
            });

            let report = run_track(config, options, cancel).await?;
            print_error_statistics(&report.stats);
            println!(
                "✅ Replayed {} event{} ({} dropped, {} malformed): {} emission{} sent, {} failed in {:.1}s",
                report.replay.dispatched,
                if report.replay.dispatched == 1 { "" } else { "s" },
                report.replay.dropped,
                report.replay.malformed,
                report.emitted,
                if report.emitted == 1 { "" } else { "s" },
                report.failed,
                report.elapsed_seconds
            );
        }
    }
    Ok(())
}
