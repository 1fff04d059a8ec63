pub mod analyzer;
pub mod config;
pub mod manager;
pub mod metrics;
pub mod monitor;
pub mod prematch;
pub mod replay;
pub mod store;
pub mod testing;
pub mod uploader;

pub use analyzer::{
    compute_fingerprint, Analysis, AnalysisOutcome, Analyzer, AnalyzerConfig, AnalyzerError,
    CommandDecoder, ReplayAnalyzer, ReplayDecoder,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ApiConfig, Config, ConfigError,
    FeaturesConfig, PathsConfig, ServerConfig,
};
pub use manager::{Manager, ManagerConfig, ManagerError, ManagerStatus, RetryPolicy};
pub use monitor::{FileMonitor, MonitorError, MonitorEvent, NotifyMonitor, WatchChannel};
pub use prematch::{PreMatchError, PreMatchProcessor, PrematchPlayer};
pub use replay::{ItemEvent, ReplayIdentity, ReplayItem, StatusCounts, StoredReplay, UploadStatus};
pub use store::{JsonReplayStore, ReplayStore, StoreError};
pub use uploader::{
    Browser, HttpUploadClient, PostMatchConfig, SystemBrowser, UploadClient, UploadError,
};
