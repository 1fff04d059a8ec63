//! Trait definitions for the store module.

use async_trait::async_trait;

use crate::replay::StoredReplay;

/// Persistence for the processed-replay history.
///
/// Neither operation fails from the caller's point of view: problems are
/// logged and the in-memory state stays authoritative.
#[async_trait]
pub trait ReplayStore: Send + Sync {
    /// Reads every stored record. Missing or unreadable history yields an empty list.
    async fn load_all(&self) -> Vec<StoredReplay>;

    /// Replaces the stored history with exactly `items`.
    async fn save_all(&self, items: &[StoredReplay]);
}
