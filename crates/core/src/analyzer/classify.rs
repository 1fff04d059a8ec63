//! Replay classification.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::config::AnalyzerConfig;
use super::error::AnalyzerError;
use super::fingerprint::compute_fingerprint;
use super::traits::{Analyzer, ReplayDecoder};
use super::types::{
    Analysis, AnalysisOutcome, DecodeStatus, DecodedReplay, GameMode, ReplayMetadata,
};

/// Analyzer that classifies decoded replays and fingerprints viable ones.
pub struct ReplayAnalyzer {
    decoder: Arc<dyn ReplayDecoder>,
    minimum_build: u32,
}

impl ReplayAnalyzer {
    pub fn new(decoder: Arc<dyn ReplayDecoder>, config: &AnalyzerConfig) -> Self {
        Self {
            decoder,
            minimum_build: config.minimum_build,
        }
    }

    /// Classifies an already decoded replay.
    pub fn classify(&self, replay: &DecodedReplay) -> Analysis {
        let outcome = match replay.status {
            DecodeStatus::Success => None,
            DecodeStatus::TryMeMode => Some(AnalysisOutcome::AiDetected),
            DecodeStatus::PtrRegion => Some(AnalysisOutcome::RegionRestricted),
            DecodeStatus::PreAlphaWipe => Some(AnalysisOutcome::TooOld),
            DecodeStatus::Incomplete | DecodeStatus::Failed => Some(AnalysisOutcome::Incomplete),
        };
        if let Some(outcome) = outcome {
            return Analysis::rejected(outcome);
        }

        if replay.has_ai {
            return Analysis::rejected(AnalysisOutcome::AiDetected);
        }
        if replay.build < self.minimum_build {
            return Analysis::rejected(AnalysisOutcome::TooOld);
        }
        if replay.game_mode == GameMode::Custom {
            return Analysis::rejected(AnalysisOutcome::CustomGame);
        }
        if replay.players.is_empty() {
            return Analysis::rejected(AnalysisOutcome::Incomplete);
        }

        let tags: Vec<&str> = replay.players.iter().map(|p| p.battle_tag.as_str()).collect();
        let fingerprint = compute_fingerprint(&tags, replay.random_value);

        Analysis::viable(
            fingerprint,
            Some(ReplayMetadata {
                build: replay.build,
                game_mode: replay.game_mode,
                player_count: replay.players.len(),
            }),
        )
    }
}

#[async_trait]
impl Analyzer for ReplayAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<Analysis, AnalyzerError> {
        let decoded = self.decoder.decode_replay(path).await?;
        let analysis = self.classify(&decoded);
        debug!(
            path = %path.display(),
            decoder = self.decoder.name(),
            outcome = ?analysis.outcome,
            "Replay analyzed"
        );
        Ok(analysis)
    }
}
