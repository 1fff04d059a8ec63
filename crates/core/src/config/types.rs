use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::analyzer::AnalyzerConfig;
use crate::manager::ManagerConfig;
use crate::uploader::PostMatchConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub manager: ManagerConfig,
    #[serde(default)]
    pub post_match: PostMatchConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

/// Local API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8765
}

/// Where the game writes its files and where we keep our own state.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Game account directory, searched recursively for replays and saves.
    #[serde(default = "default_replay_dir")]
    pub replay_dir: PathBuf,
    /// Directory the game writes transient lobby files into.
    #[serde(default = "default_lobby_dir")]
    pub lobby_dir: PathBuf,
    /// Application data directory (holds the processed-replay history).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl PathsConfig {
    /// Path of the persisted replay history document.
    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("replays.json")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            replay_dir: default_replay_dir(),
            lobby_dir: default_lobby_dir(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_replay_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Heroes of the Storm")
        .join("Accounts")
}

fn default_lobby_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("replaylink"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Remote ingestion service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API root used for fingerprint checks and uploads.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Host root of the open API queried for match parse status.
    #[serde(default = "default_open_api_url")]
    pub open_api_url: String,
    /// Public website root used for pre-match and post-match pages.
    #[serde(default = "default_web_url")]
    pub web_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Client tag sent with every upload.
    #[serde(default = "default_client_version")]
    pub client_version: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            open_api_url: default_open_api_url(),
            web_url: default_web_url(),
            timeout_secs: default_timeout(),
            client_version: default_client_version(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.heroesprofile.com/api".to_string()
}

fn default_open_api_url() -> String {
    "https://api.heroesprofile.com".to_string()
}

fn default_web_url() -> String {
    "https://www.heroesprofile.com".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_client_version() -> String {
    "replaylink".to_string()
}

/// Runtime feature toggles. These are initial values; both can be changed while running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub pre_match_enabled: bool,
    #[serde(default)]
    pub post_match_enabled: bool,
}
