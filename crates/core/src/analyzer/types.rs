//! Types for the analyzer module.

use serde::{Deserialize, Serialize};

use crate::replay::UploadStatus;

/// Parse status reported by the external decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStatus {
    Success,
    /// The file is truncated or still being written.
    Incomplete,
    /// Recorded in the game's AI practice mode.
    TryMeMode,
    /// Recorded on the public test realm.
    PtrRegion,
    /// Recorded before the last progression wipe.
    PreAlphaWipe,
    /// Any status this build does not know about.
    #[serde(other)]
    Failed,
}

/// Game mode of a decoded replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    QuickMatch,
    UnrankedDraft,
    HeroLeague,
    TeamLeague,
    StormLeague,
    Brawl,
    ArenaMode,
    Custom,
    #[serde(other)]
    Unknown,
}

/// A participant as reported by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPlayer {
    /// Full battle tag, `Name#1234`.
    pub battle_tag: String,
    /// Account id from the player's toon handle.
    #[serde(default)]
    pub toon_id: i64,
    /// Region from the player's toon handle.
    #[serde(default)]
    pub region: i32,
}

/// Header-level information decoded from a finished match recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedReplay {
    pub status: DecodeStatus,
    #[serde(default)]
    pub build: u32,
    #[serde(default = "default_game_mode")]
    pub game_mode: GameMode,
    #[serde(default)]
    pub has_ai: bool,
    /// Per-match random seed; part of the fingerprint.
    #[serde(default)]
    pub random_value: u64,
    #[serde(default)]
    pub players: Vec<DecodedPlayer>,
}

fn default_game_mode() -> GameMode {
    GameMode::Unknown
}

/// Participants decoded from a pre-match lobby file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedLobby {
    pub status: DecodeStatus,
    #[serde(default)]
    pub players: Vec<DecodedPlayer>,
}

/// Classification of an analyzed replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Viable for upload.
    Success,
    Incomplete,
    RegionRestricted,
    TooOld,
    AiDetected,
    CustomGame,
}

impl AnalysisOutcome {
    /// The terminal status for outcomes that stop processing; `None` for viable replays.
    pub fn disqualification(self) -> Option<UploadStatus> {
        match self {
            AnalysisOutcome::Success => None,
            AnalysisOutcome::Incomplete => Some(UploadStatus::Incomplete),
            AnalysisOutcome::RegionRestricted => Some(UploadStatus::RegionRestricted),
            AnalysisOutcome::TooOld => Some(UploadStatus::TooOld),
            AnalysisOutcome::AiDetected => Some(UploadStatus::AiDetected),
            AnalysisOutcome::CustomGame => Some(UploadStatus::CustomGame),
        }
    }
}

/// Structured metadata kept from a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayMetadata {
    pub build: u32,
    pub game_mode: GameMode,
    pub player_count: usize,
}

/// Result of analyzing one replay file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub outcome: AnalysisOutcome,
    /// Present when the replay decoded successfully.
    pub fingerprint: Option<String>,
    pub metadata: Option<ReplayMetadata>,
}

impl Analysis {
    /// A rejected replay with no fingerprint.
    pub fn rejected(outcome: AnalysisOutcome) -> Self {
        Self {
            outcome,
            fingerprint: None,
            metadata: None,
        }
    }

    /// A viable replay.
    pub fn viable(fingerprint: impl Into<String>, metadata: Option<ReplayMetadata>) -> Self {
        Self {
            outcome: AnalysisOutcome::Success,
            fingerprint: Some(fingerprint.into()),
            metadata,
        }
    }
}
