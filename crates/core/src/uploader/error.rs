//! Error types for the uploader module.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// An upload was attempted before the replay was fingerprinted.
    ///
    /// This is an ordering bug in the caller, never a runtime condition.
    #[error("Replay {path} has no fingerprint")]
    MissingFingerprint { path: PathBuf },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to read replay {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl UploadError {
    /// Whether the failure is a caller bug rather than an environmental problem.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingFingerprint { .. })
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UploadError::Timeout
        } else if e.is_connect() {
            UploadError::ConnectionFailed(e.to_string())
        } else {
            UploadError::ApiError(e.to_string())
        }
    }
}
