//! In-memory replay store for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::replay::StoredReplay;
use crate::store::ReplayStore;

/// ReplayStore that keeps the history in memory and counts saves.
#[derive(Debug, Default)]
pub struct MemoryReplayStore {
    records: Arc<RwLock<Vec<StoredReplay>>>,
    saves: AtomicUsize,
}

impl MemoryReplayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `records`.
    pub fn with_records(records: Vec<StoredReplay>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            saves: AtomicUsize::new(0),
        }
    }

    /// The records as last saved.
    pub async fn records(&self) -> Vec<StoredReplay> {
        self.records.read().await.clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplayStore for MemoryReplayStore {
    async fn load_all(&self) -> Vec<StoredReplay> {
        self.records.read().await.clone()
    }

    async fn save_all(&self, items: &[StoredReplay]) {
        *self.records.write().await = items.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
    }
}
