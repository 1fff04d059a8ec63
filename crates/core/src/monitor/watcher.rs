//! File monitor backed by the `notify` crate.

use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::error::MonitorError;
use super::scan::scan_directory;
use super::traits::FileMonitor;
use super::types::{MonitorEvent, WatchChannel};
use crate::config::PathsConfig;
use crate::replay::ReplayIdentity;

const EVENT_CAPACITY: usize = 256;

/// File monitor with one OS watcher per enabled channel.
///
/// A channel's watcher exists only while the channel is enabled; disabling it
/// drops the watcher and releases the OS handle.
pub struct NotifyMonitor {
    replay_dir: PathBuf,
    lobby_dir: PathBuf,
    events_tx: broadcast::Sender<MonitorEvent>,
    watchers: Mutex<HashMap<WatchChannel, RecommendedWatcher>>,
}

impl NotifyMonitor {
    pub fn new(paths: &PathsConfig) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            replay_dir: paths.replay_dir.clone(),
            lobby_dir: paths.lobby_dir.clone(),
            events_tx,
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Directory observed by a channel.
    pub fn directory(&self, channel: WatchChannel) -> &Path {
        match channel {
            WatchChannel::Lobby => &self.lobby_dir,
            WatchChannel::StormSave | WatchChannel::Replay => &self.replay_dir,
        }
    }

    fn watchers(&self) -> MutexGuard<'_, HashMap<WatchChannel, RecommendedWatcher>> {
        self.watchers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn start_watcher(&self, channel: WatchChannel) -> Result<RecommendedWatcher, MonitorError> {
        let dir = self.directory(channel).to_path_buf();
        let failed = |reason: String| MonitorError::WatchFailed {
            channel,
            path: dir.clone(),
            reason,
        };

        let tx = self.events_tx.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for path in relevant_paths(channel, &event) {
                    debug!(%channel, path = %path.display(), "File appeared");
                    // No receivers just means nobody is listening yet.
                    let _ = tx.send(MonitorEvent::new(channel, path));
                }
            }
            Err(e) => warn!(%channel, "Watch error: {}", e),
        })
        .map_err(|e| failed(e.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::Recursive)
            .map_err(|e| failed(e.to_string()))?;

        Ok(watcher)
    }
}

/// Paths in `event` that should be reported on `channel`.
fn relevant_paths(channel: WatchChannel, event: &Event) -> Vec<PathBuf> {
    let kind_matches = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(_) => channel.reacts_to_modify(),
        _ => false,
    };
    if !kind_matches {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .filter(|p| channel.matches(p))
        .cloned()
        .collect()
}

#[async_trait]
impl FileMonitor for NotifyMonitor {
    fn set_enabled(&self, channel: WatchChannel, enabled: bool) -> Result<(), MonitorError> {
        let mut watchers = self.watchers();
        match (enabled, watchers.contains_key(&channel)) {
            (true, false) => {
                let watcher = self.start_watcher(channel)?;
                watchers.insert(channel, watcher);
                debug!(%channel, dir = %self.directory(channel).display(), "Started watching");
            }
            (false, true) => {
                watchers.remove(&channel);
                debug!(%channel, "Stopped watching");
            }
            _ => {}
        }
        Ok(())
    }

    fn is_enabled(&self, channel: WatchChannel) -> bool {
        self.watchers().contains_key(&channel)
    }

    fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events_tx.subscribe()
    }

    async fn scan_replays(&self) -> Result<Vec<ReplayIdentity>, MonitorError> {
        let root = self.replay_dir.clone();
        tokio::task::spawn_blocking(move || scan_directory(&root, WatchChannel::Replay))
            .await
            .map_err(|e| MonitorError::ScanFailed(e.to_string()))?
    }
}
