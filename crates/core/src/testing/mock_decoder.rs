//! Mock replay decoder for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::analyzer::{AnalyzerError, DecodedLobby, DecodedReplay, ReplayDecoder};

/// Mock implementation of the ReplayDecoder trait.
///
/// Decoding a path with no configured result fails with a decode error.
#[derive(Debug, Default)]
pub struct MockDecoder {
    replays: Arc<RwLock<HashMap<PathBuf, DecodedReplay>>>,
    lobbies: Arc<RwLock<HashMap<PathBuf, DecodedLobby>>>,
    /// Returned for any lobby path without its own entry.
    default_lobby: Arc<RwLock<Option<DecodedLobby>>>,
    replay_calls: Arc<RwLock<Vec<PathBuf>>>,
    lobby_calls: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_replay(&self, path: impl AsRef<Path>, replay: DecodedReplay) {
        self.replays
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), replay);
    }

    pub async fn set_lobby(&self, path: impl AsRef<Path>, lobby: DecodedLobby) {
        self.lobbies
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), lobby);
    }

    pub async fn set_default_lobby(&self, lobby: DecodedLobby) {
        *self.default_lobby.write().await = Some(lobby);
    }

    /// Paths passed to `decode_replay`, in call order.
    pub async fn replay_calls(&self) -> Vec<PathBuf> {
        self.replay_calls.read().await.clone()
    }

    /// Paths passed to `decode_lobby`, in call order.
    pub async fn lobby_calls(&self) -> Vec<PathBuf> {
        self.lobby_calls.read().await.clone()
    }
}

#[async_trait]
impl ReplayDecoder for MockDecoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn decode_replay(&self, path: &Path) -> Result<DecodedReplay, AnalyzerError> {
        self.replay_calls.write().await.push(path.to_path_buf());
        self.replays
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| AnalyzerError::decode_failed(format!("no fixture for {}", path.display())))
    }

    async fn decode_lobby(&self, path: &Path) -> Result<DecodedLobby, AnalyzerError> {
        self.lobby_calls.write().await.push(path.to_path_buf());
        if let Some(lobby) = self.lobbies.read().await.get(path) {
            return Ok(lobby.clone());
        }
        self.default_lobby
            .read()
            .await
            .clone()
            .ok_or_else(|| AnalyzerError::decode_failed(format!("no fixture for {}", path.display())))
    }
}
