//! Testing utilities and mock implementations.
//!
//! Mocks for every collaborator of the pipeline manager, so the whole
//! pipeline can be exercised without a game, a decoder or a network.
//!
//! # Example
//!
//! ```rust,ignore
//! use replaylink_core::testing::{MockAnalyzer, MockFileMonitor, MockUploadClient};
//!
//! let monitor = MockFileMonitor::new();
//! let analyzer = MockAnalyzer::new();
//! let uploader = MockUploadClient::new();
//!
//! uploader.add_existing("f1").await;
//! monitor.emit(WatchChannel::Replay, "/r/a.StormReplay");
//! ```

mod memory_store;
mod mock_analyzer;
mod mock_decoder;
mod mock_monitor;
mod mock_uploader;
mod recording_browser;

pub use memory_store::MemoryReplayStore;
pub use mock_analyzer::MockAnalyzer;
pub use mock_decoder::MockDecoder;
pub use mock_monitor::MockFileMonitor;
pub use mock_uploader::MockUploadClient;
pub use recording_browser::RecordingBrowser;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::path::{Path, PathBuf};

    use crate::analyzer::{DecodeStatus, DecodedLobby, DecodedPlayer, DecodedReplay, GameMode};
    use crate::replay::{ReplayIdentity, ReplayItem, StoredReplay, UploadStatus};

    /// A fixed point in time, offset by `minutes`.
    pub fn timestamp(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    pub fn identity(path: impl Into<PathBuf>, minutes: i64) -> ReplayIdentity {
        ReplayIdentity::new(path, timestamp(minutes))
    }

    pub fn replay_item(path: impl Into<PathBuf>, status: UploadStatus) -> ReplayItem {
        let mut item = ReplayItem::pending(identity(path, 0));
        item.status = status;
        item
    }

    pub fn stored(path: impl Into<PathBuf>, minutes: i64, status: UploadStatus) -> StoredReplay {
        StoredReplay {
            file_path: path.into(),
            created: timestamp(minutes),
            upload_status: status,
        }
    }

    pub fn player(battle_tag: &str, toon_id: i64) -> DecodedPlayer {
        DecodedPlayer {
            battle_tag: battle_tag.to_string(),
            toon_id,
            region: 1,
        }
    }

    /// A successfully decoded ten-player ranked replay.
    pub fn decoded_replay(random_value: u64) -> DecodedReplay {
        DecodedReplay {
            status: DecodeStatus::Success,
            build: 91000,
            game_mode: GameMode::StormLeague,
            has_ai: false,
            random_value,
            players: (1..=10)
                .map(|i| player(&format!("Player{}#{}", i, 1000 + i), i))
                .collect(),
        }
    }

    pub fn decoded_lobby() -> DecodedLobby {
        DecodedLobby {
            status: DecodeStatus::Success,
            players: (1..=10)
                .map(|i| player(&format!("Player{}#{}", i, 1000 + i), i))
                .collect(),
        }
    }

    /// Writes a small replay file and returns its path.
    pub fn write_replay(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, b"MPQ\x1b replay").unwrap();
        path
    }
}
