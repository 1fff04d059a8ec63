//! Pipeline manager implementation.
//!
//! Two background tasks run while the manager is started:
//! - Event loop: reacts to file monitor notifications (new replays, lobby files)
//! - Worker loop: pops replays off the queue one at a time and processes them

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::analyzer::Analyzer;
use crate::config::FeaturesConfig;
use crate::metrics;
use crate::monitor::{identify, FileMonitor, MonitorEvent, WatchChannel};
use crate::prematch::PreMatchProcessor;
use crate::replay::{ItemEvent, ReplayIdentity, ReplayItem, StatusCounts, UploadStatus};
use crate::store::ReplayStore;
use crate::uploader::UploadClient;

use super::collection::{sort_for_display, ReplayCollection};
use super::config::ManagerConfig;
use super::files::{copy_with_retry, wait_for_file};
use super::queue::ProcessingQueue;
use super::types::{ManagerError, ManagerStatus};

/// State shared between the manager handle and its background tasks.
struct Shared {
    config: ManagerConfig,
    store: Arc<dyn ReplayStore>,
    monitor: Arc<dyn FileMonitor>,
    analyzer: Arc<dyn Analyzer>,
    uploader: Arc<dyn UploadClient>,
    prematch: Option<Arc<PreMatchProcessor>>,

    collection: ReplayCollection,
    queue: ProcessingQueue,
    pre_match_enabled: AtomicBool,
    running: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

/// The replay pipeline manager.
pub struct Manager {
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Manager {
    /// Create a new manager. Nothing runs until [`start`](Self::start).
    pub fn new(
        config: ManagerConfig,
        features: FeaturesConfig,
        store: Arc<dyn ReplayStore>,
        monitor: Arc<dyn FileMonitor>,
        analyzer: Arc<dyn Analyzer>,
        uploader: Arc<dyn UploadClient>,
        prematch: Option<Arc<PreMatchProcessor>>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        uploader.set_post_match_enabled(features.post_match_enabled);

        Self {
            shared: Arc::new(Shared {
                config,
                store,
                monitor,
                analyzer,
                uploader,
                prematch,
                collection: ReplayCollection::new(),
                queue: ProcessingQueue::new(),
                pre_match_enabled: AtomicBool::new(features.pre_match_enabled),
                running: AtomicBool::new(false),
                shutdown_tx,
            }),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Loads history, scans the replay directory, enables the watches and
    /// spawns the background tasks. Returns without waiting for any
    /// processing. A second call while running is a no-op.
    pub async fn start(&self) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            warn!("Manager already running");
            return;
        }

        info!("Starting replay manager");

        let queued = self.shared.load_history().await;

        // Subscribe before enabling watches so no early event is missed.
        let events_rx = self.shared.monitor.subscribe();
        self.shared.apply_watches();

        let mut tasks = self.tasks.lock().await;
        tasks.push(self.spawn_event_loop(events_rx));
        tasks.push(self.spawn_worker_loop());

        let tracked = self.shared.collection.len().await;
        info!(tracked, queued, "Replay manager started");
    }

    /// Disables every watch, drops whatever is still queued, and waits for the
    /// background tasks to exit. An upload already in flight is allowed to
    /// finish.
    pub async fn stop(&self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            warn!("Manager not running");
            return;
        }

        info!("Stopping replay manager");

        for channel in WatchChannel::ALL {
            self.shared.set_watch(channel, false);
        }

        let dropped = self.shared.queue.clear().await;
        if dropped > 0 {
            warn!(dropped, "Dropped queued replays on stop");
        }

        let _ = self.shared.shutdown_tx.send(());

        let handles: Vec<JoinHandle<()>> = self.tasks.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Manager task ended abnormally: {}", e);
            }
        }

        info!("Replay manager stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Current runtime state.
    pub async fn status(&self) -> ManagerStatus {
        ManagerStatus {
            running: self.is_running(),
            queued: self.shared.queue.len().await,
            tracked: self.shared.collection.len().await,
            pre_match_enabled: self.pre_match_enabled(),
            post_match_enabled: self.post_match_enabled(),
        }
    }

    /// Every tracked replay, newest first.
    pub async fn items(&self) -> Vec<ReplayItem> {
        self.shared.collection.snapshot().await
    }

    pub async fn get(&self, path: &Path) -> Option<ReplayItem> {
        self.shared.collection.get(path).await
    }

    pub async fn counts(&self) -> StatusCounts {
        self.shared.collection.counts().await
    }

    /// Subscribes to changes of the live collection.
    pub fn subscribe(&self) -> broadcast::Receiver<ItemEvent> {
        self.shared.collection.subscribe()
    }

    /// Re-queues a replay that is pending or failed to upload.
    pub async fn retry(&self, path: &Path) -> Result<ReplayItem, ManagerError> {
        let item = match self.shared.collection.reset_pending(path).await {
            None => return Err(ManagerError::NotFound(path.to_path_buf())),
            Some(Err(status)) => {
                return Err(ManagerError::NotRetryable {
                    path: path.to_path_buf(),
                    status,
                })
            }
            Some(Ok(item)) => item,
        };

        self.shared.queue.push(path).await;
        info!(path = %path.display(), "Replay queued for retry");
        Ok(item)
    }

    /// Flags a replay whose file is gone. The record stays in the collection.
    pub async fn mark_deleted(&self, path: &Path) -> Result<ReplayItem, ManagerError> {
        self.shared
            .collection
            .update(path, ReplayItem::mark_deleted)
            .await
            .ok_or_else(|| ManagerError::NotFound(path.to_path_buf()))
    }

    pub fn pre_match_enabled(&self) -> bool {
        self.shared.pre_match_enabled.load(Ordering::SeqCst)
    }

    /// Turns pre-match mode on or off. Takes effect on the lobby and save
    /// watches immediately when running.
    pub fn set_pre_match_enabled(&self, enabled: bool) {
        self.shared.pre_match_enabled.store(enabled, Ordering::SeqCst);
        if self.is_running() {
            self.shared.set_watch(WatchChannel::Lobby, enabled);
            self.shared.set_watch(WatchChannel::StormSave, enabled);
        }
        info!(enabled, "Pre-match mode changed");
    }

    pub fn post_match_enabled(&self) -> bool {
        self.shared.uploader.post_match_enabled()
    }

    /// Turns the post-match follow-up on or off.
    pub fn set_post_match_enabled(&self, enabled: bool) {
        self.shared.uploader.set_post_match_enabled(enabled);
        info!(enabled, "Post-match mode changed");
    }

    /// Spawn the monitor event loop task.
    fn spawn_event_loop(&self, mut events_rx: broadcast::Receiver<MonitorEvent>) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let mut shutdown_rx = shared.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Monitor event loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Monitor event loop received shutdown signal");
                        break;
                    }
                    event = events_rx.recv() => match event {
                        Ok(event) => shared.handle_event(event).await,
                        Err(RecvError::Lagged(missed)) => {
                            warn!(missed, "File monitor events were dropped");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
            info!("Monitor event loop stopped");
        })
    }

    /// Spawn the worker loop task.
    fn spawn_worker_loop(&self) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let mut shutdown_rx = shared.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Worker loop started");
            'outer: loop {
                while let Some(path) = shared.queue.pop().await {
                    shared.process(&path).await;
                    if !shared.running.load(Ordering::SeqCst) {
                        break 'outer;
                    }
                }

                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Worker loop received shutdown signal");
                        break;
                    }
                    _ = shared.queue.pushed() => {}
                    _ = tokio::time::sleep(shared.config.idle_interval()) => {}
                }
            }
            info!("Worker loop stopped");
        })
    }
}

impl Shared {
    /// Seeds the collection from the stored history and a directory scan,
    /// then queues every pending replay. Returns how many were queued.
    async fn load_history(&self) -> usize {
        let stored = self.store.load_all().await;
        let scanned = match self.monitor.scan_replays().await {
            Ok(found) => found,
            Err(e) => {
                warn!("Replay directory scan failed: {}", e);
                Vec::new()
            }
        };

        let mut merged: Vec<ReplayItem> = Vec::with_capacity(stored.len() + scanned.len());
        let mut known: HashSet<PathBuf> = HashSet::new();

        for record in stored {
            let mut item = ReplayItem::from(record);
            if !known.insert(item.path.clone()) {
                continue;
            }
            if !tokio::fs::try_exists(&item.path).await.unwrap_or(false) {
                item.mark_deleted();
            }
            merged.push(item);
        }

        for identity in scanned {
            if known.insert(identity.path.clone()) {
                metrics::REPLAYS_DISCOVERED.with_label_values(&["scan"]).inc();
                merged.push(ReplayItem::pending(identity));
            }
        }

        sort_for_display(&mut merged);
        for item in merged {
            self.collection.insert(item).await;
        }

        // Oldest first, so the newest replay ends up on top of the stack.
        let mut queued = 0;
        for item in self.collection.snapshot().await.iter().rev() {
            if item.status == UploadStatus::Pending && self.queue.push(item.path.clone()).await {
                queued += 1;
            }
        }
        queued
    }

    fn set_watch(&self, channel: WatchChannel, enabled: bool) {
        if let Err(e) = self.monitor.set_enabled(channel, enabled) {
            warn!(%channel, enabled, "Failed to switch watch: {}", e);
        }
    }

    /// Enables the replay watch, and the lobby and save watches in pre-match mode.
    fn apply_watches(&self) {
        let pre_match = self.pre_match_enabled.load(Ordering::SeqCst);
        self.set_watch(WatchChannel::Replay, true);
        self.set_watch(WatchChannel::Lobby, pre_match);
        self.set_watch(WatchChannel::StormSave, pre_match);
    }

    async fn handle_event(&self, event: MonitorEvent) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        match event.channel {
            WatchChannel::Replay => self.on_replay_created(event.path).await,
            WatchChannel::Lobby => self.on_lobby_changed(event.path).await,
            WatchChannel::StormSave => {
                info!(path = %event.path.display(), "Match in progress");
            }
        }
    }

    async fn on_replay_created(&self, path: PathBuf) {
        if self.collection.contains(&path).await {
            debug!(path = %path.display(), "Replay already tracked");
            return;
        }

        // One match at a time: the lobby and save watches are done with it.
        let pre_match = self.pre_match_enabled.load(Ordering::SeqCst);
        if pre_match {
            self.set_watch(WatchChannel::Lobby, false);
            self.set_watch(WatchChannel::StormSave, false);
        }

        if !wait_for_file(&path, &self.config.file_wait).await {
            warn!(path = %path.display(), "Replay still locked, processing anyway");
        }

        let identity = identify(&path).unwrap_or_else(|e| {
            debug!(path = %path.display(), "Could not read replay metadata: {}", e);
            ReplayIdentity::new(path.clone(), Utc::now())
        });

        if self.collection.insert(ReplayItem::pending(identity)).await {
            metrics::REPLAYS_DISCOVERED.with_label_values(&["watch"]).inc();
            self.queue.push(path.clone()).await;
            info!(path = %path.display(), "New replay queued");
        }

        // Re-arm for the next match.
        if pre_match && self.pre_match_enabled.load(Ordering::SeqCst) {
            self.set_watch(WatchChannel::Lobby, true);
            self.set_watch(WatchChannel::StormSave, true);
        }
    }

    async fn on_lobby_changed(&self, path: PathBuf) {
        if !self.pre_match_enabled.load(Ordering::SeqCst) {
            return;
        }
        // The lobby file is rewritten several times; only the first event counts.
        if !self.monitor.is_enabled(WatchChannel::Lobby) {
            debug!(path = %path.display(), "Ignoring lobby event, watch already consumed");
            return;
        }
        self.set_watch(WatchChannel::Lobby, false);
        info!(path = %path.display(), "Lobby file detected");

        let copy = std::env::temp_dir().join(format!("replaylink-{}.battlelobby", Uuid::new_v4()));
        if let Err(e) = copy_with_retry(&path, &copy, &self.config.lobby_copy).await {
            error!(
                path = %path.display(),
                "Failed to copy lobby file after {} attempts: {}",
                self.config.lobby_copy.max_attempts,
                e
            );
            return;
        }

        let Some(prematch) = self.prematch.clone() else {
            warn!("Pre-match mode is on but no pre-match processor is configured");
            let _ = tokio::fs::remove_file(&copy).await;
            return;
        };

        tokio::spawn(async move {
            prematch.open_pre_match_page(&copy).await;
            if let Err(e) = tokio::fs::remove_file(&copy).await {
                debug!(path = %copy.display(), "Failed to remove lobby copy: {}", e);
            }
        });
    }

    /// Processes one queued replay to a final status and saves the history.
    async fn process(&self, path: &Path) {
        let Some(item) = self.collection.claim(path).await else {
            debug!(path = %path.display(), "Skipping replay no longer eligible");
            return;
        };

        let status = match self.run_pipeline(item).await {
            Ok(status) => status,
            Err(e) => {
                metrics::PROCESSING_ERRORS.inc();
                match &e {
                    ManagerError::Upload(upload) if upload.is_precondition() => {
                        error!(path = %path.display(), "Pipeline ordering bug: {}", e);
                    }
                    _ => warn!(path = %path.display(), "Replay processing failed: {}", e),
                }
                UploadStatus::UploadError
            }
        };

        self.collection.set_status(path, status).await;
        metrics::REPLAYS_PROCESSED
            .with_label_values(&[status.as_str()])
            .inc();
        info!(path = %path.display(), %status, "Replay processed");

        let snapshot = self.collection.persisted().await;
        self.store.save_all(&snapshot).await;
    }

    /// Analyze, check for a duplicate, then upload.
    async fn run_pipeline(&self, mut item: ReplayItem) -> Result<UploadStatus, ManagerError> {
        let analysis = match self.analyzer.analyze(&item.path).await {
            Ok(analysis) => analysis,
            Err(e) if e.is_retryable() => return Err(e.into()),
            Err(e) => {
                warn!(path = %item.path.display(), "Replay could not be decoded: {}", e);
                return Ok(UploadStatus::Incomplete);
            }
        };

        if let Some(status) = analysis.outcome.disqualification() {
            info!(path = %item.path.display(), %status, "Replay disqualified");
            return Ok(status);
        }

        if let Some(fingerprint) = analysis.fingerprint {
            let recorded = fingerprint.clone();
            self.collection
                .update(&item.path, move |live| live.fingerprint = Some(recorded))
                .await;
            item.fingerprint = Some(fingerprint.clone());

            let batch = HashSet::from([fingerprint.clone()]);
            if self.uploader.check_duplicates(&batch).await.contains(&fingerprint) {
                info!(path = %item.path.display(), "Replay already uploaded");
                return Ok(UploadStatus::Duplicate);
            }
        }

        Ok(self.uploader.upload(&item).await?)
    }
}
