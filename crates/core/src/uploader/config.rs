//! Post-match follow-up configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controls polling for the match page after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMatchConfig {
    /// Maximum number of "is it parsed yet" polls.
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,

    /// Delay between polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Replays last written longer ago than this are not followed up.
    #[serde(default = "default_max_replay_age_mins")]
    pub max_replay_age_mins: u64,
}

fn default_poll_attempts() -> u32 {
    10
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_max_replay_age_mins() -> u64 {
    60
}

impl Default for PostMatchConfig {
    fn default() -> Self {
        Self {
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            max_replay_age_mins: default_max_replay_age_mins(),
        }
    }
}

impl PostMatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_replay_age(&self) -> Duration {
        Duration::from_secs(self.max_replay_age_mins * 60)
    }
}
