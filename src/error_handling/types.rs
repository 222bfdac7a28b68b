//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout the crate.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The configured route pattern is not a valid regex.
    #[error("Invalid route pattern '{pattern}': {source}")]
    RoutePatternError {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Error types for collector emission.
///
/// These never reach the page: the tracker logs them and moves on.
#[derive(Error, Debug)]
pub enum EmitError {
    /// The request could not be sent or timed out.
    #[error("Collector request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: ReqwestError,
    },

    /// The collector answered with a non-success status.
    #[error("Collector {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The payload could not be serialized.
    #[error("Payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error types for visitor session persistence.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The session file could not be read or written.
    #[error("Session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file is not valid JSON.
    #[error("Session store parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Types of errors counted while tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorType {
    EmitRequestError,
    EmitStatusError,
    EmitSerializeError,
    SessionStoreError,
}

/// Types of warnings counted while rewriting content.
///
/// Warnings mark embed markup that was left inert instead of being hydrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    MissingIframeSrc,    // Any iframe without a src; its host cannot be checked
    UnrecognizedVideoId, // Video-host iframe whose URL yields no id
    MissingVideoSource,  // <video> with neither src nor <source src>
    MalformedVideoUrl,   // URL parse failed; regex fallback used
}

/// Types of informational metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    VideoEmbedded,
    ButtonEmbedded,
    DirectVideoFallback, // <video> hydrated with a synthesized id
    EmitSucceeded,
    RageClickDetected,
    DeadClickRecorded,
}

impl ErrorType {
    /// Returns a human-readable string representation of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::EmitRequestError => "Collector request error",
            ErrorType::EmitStatusError => "Collector status error",
            ErrorType::EmitSerializeError => "Payload serialization error",
            ErrorType::SessionStoreError => "Session store error",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::MissingIframeSrc => "Iframe without src",
            WarningType::UnrecognizedVideoId => "Unrecognized video id",
            WarningType::MissingVideoSource => "Video tag without source",
            WarningType::MalformedVideoUrl => "Malformed video URL",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::VideoEmbedded => "Video embedded",
            InfoType::ButtonEmbedded => "Button embedded",
            InfoType::DirectVideoFallback => "Direct video fallback id",
            InfoType::EmitSucceeded => "Emission sent",
            InfoType::RageClickDetected => "Rage click detected",
            InfoType::DeadClickRecorded => "Dead click recorded",
        }
    }
}

impl From<&EmitError> for ErrorType {
    fn from(e: &EmitError) -> Self {
        match e {
            EmitError::Request { .. } => ErrorType::EmitRequestError,
            EmitError::Status { .. } => ErrorType::EmitStatusError,
            EmitError::Serialize(_) => ErrorType::EmitSerializeError,
        }
    }
}
