//! Replay item types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::status::{StatusCounts, UploadStatus};

/// A replay file as found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayIdentity {
    /// Absolute path of the file. Two identities with the same path are the same replay.
    pub path: PathBuf,
    /// Filesystem creation time (falls back to modification time where unsupported).
    pub created: DateTime<Utc>,
}

impl ReplayIdentity {
    pub fn new(path: impl Into<PathBuf>, created: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            created,
        }
    }
}

/// A tracked replay and its processing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayItem {
    pub path: PathBuf,
    pub created: DateTime<Utc>,
    pub status: UploadStatus,
    /// Content fingerprint, only known after a successful analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Set once the file is gone from disk. Never cleared.
    #[serde(default)]
    pub deleted: bool,
}

impl ReplayItem {
    /// A freshly discovered replay waiting for processing.
    pub fn pending(identity: ReplayIdentity) -> Self {
        Self {
            path: identity.path,
            created: identity.created,
            status: UploadStatus::Pending,
            fingerprint: None,
            deleted: false,
        }
    }

    pub fn identity(&self) -> ReplayIdentity {
        ReplayIdentity::new(self.path.clone(), self.created)
    }

    /// File name without extension, used for display and multipart uploads.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// File name with extension.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn is(&self, path: &Path) -> bool {
        self.path == path
    }

    /// Soft-delete. The record stays in history.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    pub fn to_stored(&self) -> StoredReplay {
        StoredReplay {
            file_path: self.path.clone(),
            created: self.created,
            upload_status: self.status,
        }
    }
}

impl From<StoredReplay> for ReplayItem {
    fn from(stored: StoredReplay) -> Self {
        Self {
            path: stored.file_path,
            created: stored.created,
            status: stored.upload_status,
            fingerprint: None,
            deleted: false,
        }
    }
}

/// The persisted subset of a [`ReplayItem`].
///
/// Serialized as `{"filePath": ..., "created": ..., "uploadStatus": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReplay {
    pub file_path: PathBuf,
    pub created: DateTime<Utc>,
    pub upload_status: UploadStatus,
}

/// Change notification for observers of the live collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemEvent {
    /// A replay entered the collection.
    Added { item: ReplayItem },
    /// A replay's status or flags changed.
    Updated { item: ReplayItem },
    /// A replay left the collection.
    Removed { path: PathBuf },
    /// Aggregate counts after the change above.
    Counts { counts: StatusCounts },
}
