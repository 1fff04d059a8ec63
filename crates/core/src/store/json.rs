//! JSON file store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::error::StoreError;
use super::traits::ReplayStore;
use crate::replay::StoredReplay;

/// Stores the history as a pretty-printed JSON array.
///
/// Writes go to a sibling temp file which is then renamed over the target, so
/// a reader never sees a half-written document. Loads and saves share one lock.
pub struct JsonReplayStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonReplayStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the history, reporting failures instead of swallowing them.
    ///
    /// A missing file is not an error.
    pub async fn try_load(&self) -> Result<Vec<StoredReplay>, StoreError> {
        let _guard = self.lock.lock().await;

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Saves the history, reporting failures instead of swallowing them.
    pub async fn try_save(&self, items: &[StoredReplay]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(items)?;

        let _guard = self.lock.lock().await;

        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(write_err)?;

        debug!(path = %self.path.display(), count = items.len(), "Saved replay history");
        Ok(())
    }
}

#[async_trait]
impl ReplayStore for JsonReplayStore {
    async fn load_all(&self) -> Vec<StoredReplay> {
        match self.try_load().await {
            Ok(items) => items,
            Err(e) => {
                warn!("Ignoring replay history: {}", e);
                Vec::new()
            }
        }
    }

    async fn save_all(&self, items: &[StoredReplay]) {
        if let Err(e) = self.try_save(items).await {
            error!("Failed to save replay history: {}", e);
        }
    }
}
