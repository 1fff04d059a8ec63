//! Trait definitions for the uploader module.

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::warn;

use super::error::UploadError;
use crate::metrics;
use crate::replay::{ReplayItem, UploadStatus};

/// Client for the remote ingestion service.
#[async_trait]
pub trait UploadClient: Send + Sync {
    /// Returns the subset of `fingerprints` the service already knows.
    async fn try_check_duplicates(
        &self,
        fingerprints: &HashSet<String>,
    ) -> Result<HashSet<String>, UploadError>;

    /// Uploads the replay file and returns the status the service assigned.
    ///
    /// Fails with [`UploadError::MissingFingerprint`] if the item was not
    /// fingerprinted. Protocol problems (bad HTTP status, unreadable body,
    /// unknown status) come back as `Ok(UploadStatus::UploadError)`.
    async fn upload(&self, item: &ReplayItem) -> Result<UploadStatus, UploadError>;

    /// Turns the post-match follow-up on or off.
    fn set_post_match_enabled(&self, enabled: bool);

    fn post_match_enabled(&self) -> bool;

    /// Duplicate check that never fails: errors are logged and treated as
    /// "none of these exist".
    async fn check_duplicates(&self, fingerprints: &HashSet<String>) -> HashSet<String> {
        match self.try_check_duplicates(fingerprints).await {
            Ok(existing) => existing,
            Err(e) => {
                metrics::DUPLICATE_CHECK_FAILURES.inc();
                warn!("Duplicate check failed, assuming no duplicates: {}", e);
                HashSet::new()
            }
        }
    }
}
