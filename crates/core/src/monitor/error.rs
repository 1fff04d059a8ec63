//! Error types for the monitor module.

use std::path::PathBuf;
use thiserror::Error;

use super::types::WatchChannel;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to watch {channel} channel at {path}: {reason}")]
    WatchFailed {
        channel: WatchChannel,
        path: PathBuf,
        reason: String,
    },

    #[error("Directory scan failed: {0}")]
    ScanFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
