//! Manager types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::analyzer::AnalyzerError;
use crate::replay::UploadStatus;
use crate::uploader::UploadError;

/// Errors from manager operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// No tracked replay has this path.
    #[error("replay not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The replay's status is sticky.
    #[error("replay {} cannot be retried from status {status}", .path.display())]
    NotRetryable { path: PathBuf, status: UploadStatus },

    /// The analyzer could not run.
    #[error("analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),

    /// The upload failed before the service answered.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
}

/// Snapshot of the manager's runtime state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerStatus {
    pub running: bool,
    /// Replays waiting in the queue.
    pub queued: usize,
    /// Replays tracked in total.
    pub tracked: usize,
    pub pre_match_enabled: bool,
    pub post_match_enabled: bool,
}
