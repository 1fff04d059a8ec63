//! Manager configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_delay_ms() -> u64 {
    100
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Configuration for the pipeline manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// How long the worker idles once the queue is empty (seconds).
    #[serde(default = "default_idle_interval")]
    pub idle_interval_secs: u64,

    /// Waiting for a new replay to be released by the game.
    #[serde(default)]
    pub file_wait: RetryPolicy,

    /// Copying a lobby file out of the game's temp directory.
    #[serde(default)]
    pub lobby_copy: RetryPolicy,
}

fn default_idle_interval() -> u64 {
    30
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            idle_interval_secs: default_idle_interval(),
            file_wait: RetryPolicy::default(),
            lobby_copy: RetryPolicy::default(),
        }
    }
}

impl ManagerConfig {
    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.idle_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::default();
        assert_eq!(config.idle_interval(), Duration::from_secs(30));
        assert_eq!(config.file_wait.max_attempts, 10);
        assert_eq!(config.lobby_copy.delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_nested_policy_from_toml() {
        let config: ManagerConfig = toml::from_str(
            r#"
            idle_interval_secs = 5

            [file_wait]
            max_attempts = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.idle_interval_secs, 5);
        assert_eq!(config.file_wait.max_attempts, 3);
        assert_eq!(config.file_wait.delay_ms, 100);
        assert_eq!(config.lobby_copy, RetryPolicy::default());
    }
}
