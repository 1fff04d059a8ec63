//! Replay analysis.
//!
//! The binary replay format is decoded by an external tool behind the
//! [`ReplayDecoder`] trait. [`ReplayAnalyzer`] turns a decoded replay into an
//! [`Analysis`]: a classification, and for viable replays the content
//! fingerprint used for server-side deduplication.

mod classify;
mod command;
mod config;
mod error;
mod fingerprint;
mod traits;
mod types;

pub use classify::ReplayAnalyzer;
pub use command::CommandDecoder;
pub use config::AnalyzerConfig;
pub use error::AnalyzerError;
pub use fingerprint::compute_fingerprint;
pub use traits::{Analyzer, ReplayDecoder};
pub use types::{
    Analysis, AnalysisOutcome, DecodeStatus, DecodedLobby, DecodedPlayer, DecodedReplay,
    GameMode, ReplayMetadata,
};
