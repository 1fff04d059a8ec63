//! Trait definitions for the analyzer module.

use async_trait::async_trait;
use std::path::Path;

use super::error::AnalyzerError;
use super::types::{Analysis, DecodedLobby, DecodedReplay};

/// Classifies a replay file and computes its fingerprint.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyzes the replay at `path`.
    ///
    /// Disqualifications are returned as `Ok` with the matching outcome; errors
    /// are reserved for files that could not be decoded at all.
    async fn analyze(&self, path: &Path) -> Result<Analysis, AnalyzerError>;
}

/// Decoder for the game's binary replay and lobby formats.
#[async_trait]
pub trait ReplayDecoder: Send + Sync {
    /// Returns the name of this decoder implementation.
    fn name(&self) -> &str;

    /// Decodes the header of a finished match recording.
    async fn decode_replay(&self, path: &Path) -> Result<DecodedReplay, AnalyzerError>;

    /// Decodes the participants of a pre-match lobby file.
    async fn decode_lobby(&self, path: &Path) -> Result<DecodedLobby, AnalyzerError>;

    /// Validates that the decoder is properly configured and ready.
    async fn validate(&self) -> Result<(), AnalyzerError> {
        Ok(())
    }
}
