//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions
//! - Processing statistics tracking (errors, warnings, info metrics)
//!
//! Counters are categorized into:
//! - **Errors**: Collector or session store failures (logged, never surfaced)
//! - **Warnings**: Embed markup skipped during rewriting
//! - **Info**: Informational metrics (embeds hydrated, rage clicks, ...)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{EmitError, ErrorType, InfoType, InitializationError, SessionError, WarningType};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_processing_stats_initialization() {
        let stats = ProcessingStats::new();
        for error_type in ErrorType::iter() {
            assert_eq!(stats.get_error_count(error_type), 0);
        }
        for warning_type in WarningType::iter() {
            assert_eq!(stats.get_warning_count(warning_type), 0);
        }
        for info_type in InfoType::iter() {
            assert_eq!(stats.get_info_count(info_type), 0);
        }
    }

    #[test]
    fn test_processing_stats_increment() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::EmitStatusError);
        assert_eq!(stats.get_error_count(ErrorType::EmitStatusError), 1);

        stats.increment_warning(WarningType::MissingVideoSource);
        stats.increment_warning(WarningType::MissingVideoSource);
        assert_eq!(stats.get_warning_count(WarningType::MissingVideoSource), 2);
        assert_eq!(stats.total_warnings(), 2);

        stats.increment_info(InfoType::VideoEmbedded);
        assert_eq!(stats.get_info_count(InfoType::VideoEmbedded), 1);
        assert_eq!(stats.total_errors(), 1);
    }

    #[test]
    fn test_emit_error_maps_to_error_type() {
        let status = EmitError::Status {
            endpoint: "track-scroll".to_string(),
            status: 500,
        };
        assert_eq!(ErrorType::from(&status), ErrorType::EmitStatusError);
        assert!(status.to_string().contains("HTTP 500"));

        let bad_json: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let serialize = EmitError::from(bad_json);
        assert_eq!(ErrorType::from(&serialize), ErrorType::EmitSerializeError);
    }
}
