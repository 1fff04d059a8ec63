//! LIFO processing queue.

use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, Notify};

use crate::metrics;

/// Stack of replay paths awaiting processing.
///
/// The most recently pushed path is popped first. A path that is already
/// queued is not queued again.
#[derive(Debug, Default)]
pub struct ProcessingQueue {
    stack: Mutex<Vec<PathBuf>>,
    pushed: Notify,
}

impl ProcessingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a path. Returns `false` if it was already queued.
    pub async fn push(&self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        let mut stack = self.stack.lock().await;
        if stack.contains(&path) {
            return false;
        }
        stack.push(path);
        metrics::QUEUE_DEPTH.set(stack.len() as i64);
        drop(stack);
        self.pushed.notify_one();
        true
    }

    pub async fn pop(&self) -> Option<PathBuf> {
        let mut stack = self.stack.lock().await;
        let path = stack.pop();
        metrics::QUEUE_DEPTH.set(stack.len() as i64);
        path
    }

    /// Drops everything queued. Returns how many paths were dropped.
    pub async fn clear(&self) -> usize {
        let mut stack = self.stack.lock().await;
        let dropped = stack.len();
        stack.clear();
        metrics::QUEUE_DEPTH.set(0);
        dropped
    }

    pub async fn len(&self) -> usize {
        self.stack.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.stack.lock().await.is_empty()
    }

    pub async fn contains(&self, path: &Path) -> bool {
        self.stack.lock().await.iter().any(|p| p == path)
    }

    /// Resolves after the next push. A push that happened while nobody was
    /// waiting is remembered, so it is not lost between `pop` and this call.
    pub async fn pushed(&self) {
        self.pushed.notified().await;
    }
}
