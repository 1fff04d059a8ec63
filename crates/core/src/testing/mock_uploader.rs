//! Mock upload client for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::replay::{ReplayItem, UploadStatus};
use crate::uploader::{UploadClient, UploadError};

/// Mock implementation of the UploadClient trait.
///
/// Uploads succeed unless a status is configured for the fingerprint. Like the
/// real client it refuses items without a fingerprint.
#[derive(Debug, Default)]
pub struct MockUploadClient {
    /// Fingerprints the "service" already has.
    existing: Arc<RwLock<HashSet<String>>>,
    /// Upload results by fingerprint.
    statuses: Arc<RwLock<HashMap<String, UploadStatus>>>,
    /// When set, every duplicate check fails with a connection error.
    duplicate_check_down: Arc<AtomicBool>,
    /// When set, the next upload fails with this error.
    next_upload_error: Arc<RwLock<Option<UploadError>>>,
    duplicate_checks: Arc<RwLock<Vec<HashSet<String>>>>,
    uploads: Arc<RwLock<Vec<ReplayItem>>>,
    post_match_enabled: AtomicBool,
}

impl MockUploadClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the service already has this fingerprint.
    pub async fn add_existing(&self, fingerprint: &str) {
        self.existing.write().await.insert(fingerprint.to_string());
    }

    /// Result of uploading the replay with this fingerprint.
    pub async fn set_upload_status(&self, fingerprint: &str, status: UploadStatus) {
        self.statuses
            .write()
            .await
            .insert(fingerprint.to_string(), status);
    }

    pub fn set_duplicate_check_down(&self, down: bool) {
        self.duplicate_check_down.store(down, Ordering::SeqCst);
    }

    pub async fn set_next_upload_error(&self, error: UploadError) {
        *self.next_upload_error.write().await = Some(error);
    }

    /// Replays passed to `upload`, in call order.
    pub async fn uploads(&self) -> Vec<ReplayItem> {
        self.uploads.read().await.clone()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Batches passed to the duplicate check, in call order.
    pub async fn duplicate_checks(&self) -> Vec<HashSet<String>> {
        self.duplicate_checks.read().await.clone()
    }
}

#[async_trait]
impl UploadClient for MockUploadClient {
    async fn try_check_duplicates(
        &self,
        fingerprints: &HashSet<String>,
    ) -> Result<HashSet<String>, UploadError> {
        self.duplicate_checks
            .write()
            .await
            .push(fingerprints.clone());

        if self.duplicate_check_down.load(Ordering::SeqCst) {
            return Err(UploadError::ConnectionFailed(
                "mock service unreachable".to_string(),
            ));
        }

        let existing = self.existing.read().await;
        Ok(fingerprints
            .iter()
            .filter(|fp| existing.contains(*fp))
            .cloned()
            .collect())
    }

    async fn upload(&self, item: &ReplayItem) -> Result<UploadStatus, UploadError> {
        let fingerprint = match item.fingerprint.as_deref() {
            Some(fp) if !fp.is_empty() => fp.to_string(),
            _ => {
                return Err(UploadError::MissingFingerprint {
                    path: item.path.clone(),
                })
            }
        };

        self.uploads.write().await.push(item.clone());

        if let Some(err) = self.next_upload_error.write().await.take() {
            return Err(err);
        }

        Ok(self
            .statuses
            .read()
            .await
            .get(&fingerprint)
            .copied()
            .unwrap_or(UploadStatus::Success))
    }

    fn set_post_match_enabled(&self, enabled: bool) {
        self.post_match_enabled.store(enabled, Ordering::SeqCst);
    }

    fn post_match_enabled(&self) -> bool {
        self.post_match_enabled.load(Ordering::SeqCst)
    }
}
