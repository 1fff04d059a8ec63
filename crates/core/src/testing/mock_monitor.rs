//! Mock file monitor for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::monitor::{FileMonitor, MonitorError, MonitorEvent, WatchChannel};
use crate::replay::ReplayIdentity;

/// Mock implementation of the FileMonitor trait.
///
/// Tests drive it with [`emit`](Self::emit), which only delivers events on
/// enabled channels, like a real watcher.
#[derive(Debug)]
pub struct MockFileMonitor {
    events_tx: broadcast::Sender<MonitorEvent>,
    enabled: Mutex<HashSet<WatchChannel>>,
    /// Channels whose watch cannot be established.
    broken: Mutex<HashSet<WatchChannel>>,
    scan_result: Mutex<Vec<ReplayIdentity>>,
    /// Every successful state change, in order.
    toggles: Mutex<Vec<(WatchChannel, bool)>>,
}

impl Default for MockFileMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockFileMonitor {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(256);
        Self {
            events_tx,
            enabled: Mutex::new(HashSet::new()),
            broken: Mutex::new(HashSet::new()),
            scan_result: Mutex::new(Vec::new()),
            toggles: Mutex::new(Vec::new()),
        }
    }

    /// Replays returned by `scan_replays`.
    pub fn set_scan_result(&self, replays: Vec<ReplayIdentity>) {
        *lock(&self.scan_result) = replays;
    }

    /// Makes enabling `channel` fail.
    pub fn set_broken(&self, channel: WatchChannel, broken: bool) {
        let mut set = lock(&self.broken);
        if broken {
            set.insert(channel);
        } else {
            set.remove(&channel);
        }
    }

    /// Raises a "file appeared" event. Returns `false` (and raises nothing)
    /// if the channel is disabled.
    pub fn emit(&self, channel: WatchChannel, path: impl Into<PathBuf>) -> bool {
        if !self.is_enabled(channel) {
            return false;
        }
        let _ = self.events_tx.send(MonitorEvent::new(channel, path));
        true
    }

    pub fn toggles(&self) -> Vec<(WatchChannel, bool)> {
        lock(&self.toggles).clone()
    }
}

#[async_trait]
impl FileMonitor for MockFileMonitor {
    fn set_enabled(&self, channel: WatchChannel, enabled: bool) -> Result<(), MonitorError> {
        if enabled && lock(&self.broken).contains(&channel) {
            return Err(MonitorError::WatchFailed {
                channel,
                path: PathBuf::from("/mock"),
                reason: "mock watch failure".to_string(),
            });
        }

        let mut set = lock(&self.enabled);
        let changed = if enabled {
            set.insert(channel)
        } else {
            set.remove(&channel)
        };
        if changed {
            lock(&self.toggles).push((channel, enabled));
        }
        Ok(())
    }

    fn is_enabled(&self, channel: WatchChannel) -> bool {
        lock(&self.enabled).contains(&channel)
    }

    fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events_tx.subscribe()
    }

    async fn scan_replays(&self) -> Result<Vec<ReplayIdentity>, MonitorError> {
        Ok(lock(&self.scan_result).clone())
    }
}
