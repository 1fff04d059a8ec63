//! Trait definitions for the monitor module.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::error::MonitorError;
use super::types::{MonitorEvent, WatchChannel};
use crate::replay::ReplayIdentity;

/// Watches the game's directories for new files.
///
/// Enabling or disabling a channel that is already in the requested state is a
/// no-op. No events are raised while a channel is disabled, and nothing missed
/// while disabled is replayed on re-enable.
#[async_trait]
pub trait FileMonitor: Send + Sync {
    /// Switches one watch channel on or off.
    ///
    /// On failure the channel is left disabled.
    fn set_enabled(&self, channel: WatchChannel, enabled: bool) -> Result<(), MonitorError>;

    /// Whether a channel is currently watching.
    fn is_enabled(&self, channel: WatchChannel) -> bool;

    /// Subscribes to "file appeared" notifications from every channel.
    fn subscribe(&self) -> broadcast::Receiver<MonitorEvent>;

    /// Enumerates every match recording currently on disk.
    async fn scan_replays(&self) -> Result<Vec<ReplayIdentity>, MonitorError>;
}
