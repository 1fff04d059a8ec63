//! Live replay collection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, RwLock};

use crate::replay::{ItemEvent, ReplayItem, StatusCounts, StoredReplay, UploadStatus};

const EVENT_CAPACITY: usize = 1024;

/// Every tracked replay, keyed by path.
///
/// Each mutation is published as an [`ItemEvent`] followed by the recomputed
/// [`StatusCounts`], while the write lock is still held so observers see
/// changes in order.
pub struct ReplayCollection {
    items: RwLock<HashMap<PathBuf, ReplayItem>>,
    events_tx: broadcast::Sender<ItemEvent>,
}

impl Default for ReplayCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayCollection {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            items: RwLock::new(HashMap::new()),
            events_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ItemEvent> {
        self.events_tx.subscribe()
    }

    fn publish(&self, items: &HashMap<PathBuf, ReplayItem>, event: ItemEvent) {
        let _ = self.events_tx.send(event);
        let counts = StatusCounts::from_statuses(items.values().map(|i| i.status));
        let _ = self.events_tx.send(ItemEvent::Counts { counts });
    }

    /// Adds a replay unless one with the same path is already tracked.
    pub async fn insert(&self, item: ReplayItem) -> bool {
        let mut items = self.items.write().await;
        if items.contains_key(&item.path) {
            return false;
        }
        items.insert(item.path.clone(), item.clone());
        self.publish(&items, ItemEvent::Added { item });
        true
    }

    /// Applies `f` to the replay at `path` and returns the updated copy.
    pub async fn update<F>(&self, path: &Path, f: F) -> Option<ReplayItem>
    where
        F: FnOnce(&mut ReplayItem),
    {
        let mut items = self.items.write().await;
        let item = items.get_mut(path)?;
        f(item);
        let updated = item.clone();
        self.publish(&items, ItemEvent::Updated {
            item: updated.clone(),
        });
        Some(updated)
    }

    pub async fn set_status(&self, path: &Path, status: UploadStatus) -> Option<ReplayItem> {
        self.update(path, |item| item.status = status).await
    }

    /// Marks a queued replay as in progress.
    ///
    /// Returns `None` if the replay is unknown or no longer eligible for
    /// processing, in which case nothing changes.
    pub async fn claim(&self, path: &Path) -> Option<ReplayItem> {
        let mut items = self.items.write().await;
        let item = items.get_mut(path)?;
        if !item.status.is_retryable() {
            return None;
        }
        item.status = UploadStatus::InProgress;
        let claimed = item.clone();
        self.publish(&items, ItemEvent::Updated {
            item: claimed.clone(),
        });
        Some(claimed)
    }

    /// Puts a failed or pending replay back to `Pending`.
    ///
    /// `None` if the replay is unknown; `Err` carries the status that blocks
    /// the reset (sticky or in flight).
    pub async fn reset_pending(&self, path: &Path) -> Option<Result<ReplayItem, UploadStatus>> {
        let mut items = self.items.write().await;
        let item = items.get_mut(path)?;
        if !item.status.is_retryable() {
            return Some(Err(item.status));
        }
        item.status = UploadStatus::Pending;
        let reset = item.clone();
        self.publish(&items, ItemEvent::Updated {
            item: reset.clone(),
        });
        Some(Ok(reset))
    }

    /// Removes a replay from the collection.
    pub async fn remove(&self, path: &Path) -> Option<ReplayItem> {
        let mut items = self.items.write().await;
        let removed = items.remove(path)?;
        self.publish(&items, ItemEvent::Removed {
            path: path.to_path_buf(),
        });
        Some(removed)
    }

    pub async fn get(&self, path: &Path) -> Option<ReplayItem> {
        self.items.read().await.get(path).cloned()
    }

    pub async fn contains(&self, path: &Path) -> bool {
        self.items.read().await.contains_key(path)
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Every replay, newest first (ties broken by path).
    pub async fn snapshot(&self) -> Vec<ReplayItem> {
        let mut items: Vec<ReplayItem> = self.items.read().await.values().cloned().collect();
        sort_for_display(&mut items);
        items
    }

    pub async fn counts(&self) -> StatusCounts {
        StatusCounts::from_statuses(self.items.read().await.values().map(|i| i.status))
    }

    /// The records that belong in the persisted history, newest first.
    pub async fn persisted(&self) -> Vec<StoredReplay> {
        self.snapshot()
            .await
            .iter()
            .filter(|item| item.status.is_persisted())
            .map(ReplayItem::to_stored)
            .collect()
    }
}

pub(crate) fn sort_for_display(items: &mut [ReplayItem]) {
    items.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.path.cmp(&b.path)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ReplayIdentity;
    use chrono::{Duration, TimeZone, Utc};

    fn item(path: &str, minutes: i64) -> ReplayItem {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
        ReplayItem::pending(ReplayIdentity::new(path, base + Duration::minutes(minutes)))
    }

    #[tokio::test]
    async fn test_insert_is_keyed_by_path() {
        let collection = ReplayCollection::new();
        assert!(collection.insert(item("/r/a.StormReplay", 0)).await);
        assert!(!collection.insert(item("/r/a.StormReplay", 5)).await);
        assert_eq!(collection.len().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_newest_first() {
        let collection = ReplayCollection::new();
        collection.insert(item("/r/old.StormReplay", 0)).await;
        collection.insert(item("/r/new.StormReplay", 10)).await;
        collection.insert(item("/r/mid.StormReplay", 5)).await;

        let names: Vec<String> = collection
            .snapshot()
            .await
            .iter()
            .map(|i| i.file_stem())
            .collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_claim_only_eligible() {
        let collection = ReplayCollection::new();
        collection.insert(item("/r/a.StormReplay", 0)).await;

        let claimed = collection.claim(Path::new("/r/a.StormReplay")).await.unwrap();
        assert_eq!(claimed.status, UploadStatus::InProgress);
        assert!(collection.claim(Path::new("/r/a.StormReplay")).await.is_none());

        collection
            .set_status(Path::new("/r/a.StormReplay"), UploadStatus::Success)
            .await;
        assert!(collection.claim(Path::new("/r/a.StormReplay")).await.is_none());
        assert!(collection.claim(Path::new("/r/missing.StormReplay")).await.is_none());
    }

    #[tokio::test]
    async fn test_events_follow_mutations() {
        let collection = ReplayCollection::new();
        let mut rx = collection.subscribe();

        collection.insert(item("/r/a.StormReplay", 0)).await;
        collection
            .set_status(Path::new("/r/a.StormReplay"), UploadStatus::TooOld)
            .await;

        assert!(matches!(rx.recv().await.unwrap(), ItemEvent::Added { .. }));
        match rx.recv().await.unwrap() {
            ItemEvent::Counts { counts } => assert_eq!(counts.get(UploadStatus::Pending), 1),
            other => panic!("unexpected event {:?}", other),
        }
        match rx.recv().await.unwrap() {
            ItemEvent::Updated { item } => assert_eq!(item.status, UploadStatus::TooOld),
            other => panic!("unexpected event {:?}", other),
        }
        match rx.recv().await.unwrap() {
            ItemEvent::Counts { counts } => {
                assert_eq!(counts.get(UploadStatus::Pending), 0);
                assert_eq!(counts.get(UploadStatus::TooOld), 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_persisted_excludes_transient() {
        let collection = ReplayCollection::new();
        collection.insert(item("/r/a.StormReplay", 0)).await;
        collection.insert(item("/r/b.StormReplay", 1)).await;
        collection.insert(item("/r/c.StormReplay", 2)).await;
        collection
            .set_status(Path::new("/r/a.StormReplay"), UploadStatus::Duplicate)
            .await;
        collection
            .set_status(Path::new("/r/b.StormReplay"), UploadStatus::UploadError)
            .await;

        let persisted = collection.persisted().await;
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].upload_status, UploadStatus::Duplicate);
    }

    #[tokio::test]
    async fn test_reset_pending() {
        let collection = ReplayCollection::new();
        collection.insert(item("/r/a.StormReplay", 0)).await;
        let path = Path::new("/r/a.StormReplay");

        collection.set_status(path, UploadStatus::UploadError).await;
        let reset = collection.reset_pending(path).await.unwrap().unwrap();
        assert_eq!(reset.status, UploadStatus::Pending);

        collection.set_status(path, UploadStatus::Duplicate).await;
        assert_eq!(
            collection.reset_pending(path).await.unwrap().unwrap_err(),
            UploadStatus::Duplicate
        );
        assert!(collection
            .reset_pending(Path::new("/r/missing.StormReplay"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let collection = ReplayCollection::new();
        collection.insert(item("/r/a.StormReplay", 0)).await;
        assert!(collection.remove(Path::new("/r/a.StormReplay")).await.is_some());
        assert!(collection.is_empty().await);
    }
}
