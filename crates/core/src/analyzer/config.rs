//! Analyzer configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for replay analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// External decoder executable. Looked up on `PATH` when not absolute.
    #[serde(default = "default_decoder_command")]
    pub decoder_command: PathBuf,

    /// Replays recorded on an older client build are classified as too old.
    #[serde(default)]
    pub minimum_build: u32,

    /// Decoder process timeout in seconds.
    #[serde(default = "default_decoder_timeout")]
    pub decoder_timeout_secs: u64,
}

fn default_decoder_command() -> PathBuf {
    PathBuf::from("storm-decoder")
}

fn default_decoder_timeout() -> u64 {
    60
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            decoder_command: default_decoder_command(),
            minimum_build: 0,
            decoder_timeout_secs: default_decoder_timeout(),
        }
    }
}
