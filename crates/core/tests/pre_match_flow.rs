//! Pre-match lobby handling through the manager.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use replaylink_core::testing::{
    fixtures, MemoryReplayStore, MockAnalyzer, MockDecoder, MockFileMonitor, MockUploadClient,
    RecordingBrowser,
};
use replaylink_core::{
    Analyzer, ApiConfig, Browser, FeaturesConfig, FileMonitor, Manager, ManagerConfig,
    PreMatchProcessor, ReplayDecoder, ReplayStore, RetryPolicy, UploadClient, UploadStatus,
    WatchChannel,
};

struct PreMatchHarness {
    monitor: Arc<MockFileMonitor>,
    decoder: Arc<MockDecoder>,
    browser: Arc<RecordingBrowser>,
    manager: Manager,
    temp_dir: TempDir,
}

impl PreMatchHarness {
    async fn start() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let monitor = Arc::new(MockFileMonitor::new());
        let decoder = Arc::new(MockDecoder::new());
        decoder.set_default_lobby(fixtures::decoded_lobby()).await;
        let browser = Arc::new(RecordingBrowser::new());

        // Nothing listens here, so submissions fail fast.
        let api = ApiConfig {
            web_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..ApiConfig::default()
        };
        let prematch = PreMatchProcessor::new(
            Arc::clone(&decoder) as Arc<dyn ReplayDecoder>,
            Arc::clone(&browser) as Arc<dyn Browser>,
            &api,
        )
        .expect("Failed to build pre-match processor");

        let fast = RetryPolicy {
            max_attempts: 3,
            delay_ms: 5,
        };
        let manager = Manager::new(
            ManagerConfig {
                idle_interval_secs: 1,
                file_wait: fast,
                lobby_copy: fast,
            },
            FeaturesConfig {
                pre_match_enabled: true,
                post_match_enabled: false,
            },
            Arc::new(MemoryReplayStore::new()) as Arc<dyn ReplayStore>,
            Arc::clone(&monitor) as Arc<dyn FileMonitor>,
            Arc::new(MockAnalyzer::new()) as Arc<dyn Analyzer>,
            Arc::new(MockUploadClient::new()) as Arc<dyn UploadClient>,
            Some(Arc::new(prematch)),
        );
        manager.start().await;

        Self {
            monitor,
            decoder,
            browser,
            manager,
            temp_dir,
        }
    }

    async fn wait_for_lobby_decodes(&self, expected: usize) -> bool {
        for _ in 0..200 {
            if self.decoder.lobby_calls().await.len() >= expected {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        false
    }
}

#[tokio::test]
async fn test_lobby_event_is_decoded_once_per_match() {
    let h = PreMatchHarness::start().await;
    let lobby = h.temp_dir.path().join("replay.server.battlelobby");
    tokio::fs::write(&lobby, b"lobby").await.unwrap();

    assert!(h.monitor.is_enabled(WatchChannel::Lobby));
    assert!(h.monitor.emit(WatchChannel::Lobby, &lobby));
    assert!(h.wait_for_lobby_decodes(1).await);

    // The lobby watch is consumed until the match finishes.
    assert!(!h.monitor.is_enabled(WatchChannel::Lobby));
    assert!(!h.monitor.emit(WatchChannel::Lobby, &lobby));

    // A copy was decoded, never the live lobby file.
    let decoded = h.decoder.lobby_calls().await;
    assert_ne!(decoded[0], lobby);
    assert!(lobby.exists());

    // The site is unreachable, so no page was opened.
    assert!(h.browser.opened().is_empty());

    h.manager.stop().await;
}

#[tokio::test]
async fn test_finished_match_rearms_lobby_watch() {
    let h = PreMatchHarness::start().await;
    let lobby = h.temp_dir.path().join("replay.server.battlelobby");
    tokio::fs::write(&lobby, b"lobby").await.unwrap();

    h.monitor.emit(WatchChannel::Lobby, &lobby);
    assert!(h.wait_for_lobby_decodes(1).await);
    assert!(!h.monitor.is_enabled(WatchChannel::Lobby));

    let replay = fixtures::write_replay(h.temp_dir.path(), "match.StormReplay");
    h.monitor.emit(WatchChannel::Replay, &replay);

    let mut rearmed = false;
    for _ in 0..200 {
        if h.monitor.is_enabled(WatchChannel::Lobby) {
            rearmed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert!(rearmed);
    assert!(h.monitor.is_enabled(WatchChannel::StormSave));

    // The next match is picked up again.
    assert!(h.monitor.emit(WatchChannel::Lobby, &lobby));
    assert!(h.wait_for_lobby_decodes(2).await);

    for _ in 0..200 {
        if h.manager.get(&replay).await.map(|i| i.status) == Some(UploadStatus::Success) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(
        h.manager.get(&replay).await.unwrap().status,
        UploadStatus::Success
    );

    h.manager.stop().await;
}

#[tokio::test]
async fn test_lobby_ignored_when_pre_match_off() {
    let h = PreMatchHarness::start().await;
    h.manager.set_pre_match_enabled(false);

    let lobby = h.temp_dir.path().join("replay.server.battlelobby");
    tokio::fs::write(&lobby, b"lobby").await.unwrap();

    assert!(!h.monitor.emit(WatchChannel::Lobby, &lobby));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(h.decoder.lobby_calls().await.is_empty());

    h.manager.stop().await;
}
