//! Types for the monitor module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A watched directory and file kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchChannel {
    /// Pre-match lobby files (`*.battlelobby`) in the temp directory.
    Lobby,
    /// The game's in-progress save files (`*.StormSave`).
    StormSave,
    /// Finalized match recordings (`*.StormReplay`).
    Replay,
}

impl WatchChannel {
    pub const ALL: [WatchChannel; 3] = [
        WatchChannel::Lobby,
        WatchChannel::StormSave,
        WatchChannel::Replay,
    ];

    /// File extension observed by this channel.
    pub fn extension(self) -> &'static str {
        match self {
            WatchChannel::Lobby => "battlelobby",
            WatchChannel::StormSave => "StormSave",
            WatchChannel::Replay => "StormReplay",
        }
    }

    /// Whether `path` carries this channel's extension (case-insensitive).
    pub fn matches(self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.extension()))
    }

    /// The lobby file is rewritten in place rather than created, so that
    /// channel also reacts to modifications.
    pub fn reacts_to_modify(self) -> bool {
        matches!(self, WatchChannel::Lobby)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WatchChannel::Lobby => "lobby",
            WatchChannel::StormSave => "storm_save",
            WatchChannel::Replay => "replay",
        }
    }
}

impl fmt::Display for WatchChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A "file appeared" notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorEvent {
    pub channel: WatchChannel,
    /// Absolute path of the file.
    pub path: PathBuf,
}

impl MonitorEvent {
    pub fn new(channel: WatchChannel, path: impl Into<PathBuf>) -> Self {
        Self {
            channel,
            path: path.into(),
        }
    }
}
