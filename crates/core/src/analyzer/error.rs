//! Error types for the analyzer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding a replay or lobby file.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The decoder executable could not be started.
    #[error("Replay decoder not found at path: {path}")]
    DecoderNotFound { path: PathBuf },

    /// The input file does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The decoder ran but reported a failure.
    #[error("Decoder failed: {reason}")]
    DecodeFailed { reason: String },

    /// The decoder output could not be understood.
    #[error("Failed to parse decoder output: {reason}")]
    ParseError { reason: String },

    /// The decoder did not finish in time.
    #[error("Decoder timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while running the decoder.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    pub fn decode_failed(reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            reason: reason.into(),
        }
    }

    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }

    /// Whether the failure is environmental rather than a property of the file.
    ///
    /// Retryable failures leave the replay eligible for another attempt;
    /// the rest classify it as incomplete.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DecoderNotFound { .. } | Self::Timeout { .. } | Self::Io(_)
        )
    }
}
