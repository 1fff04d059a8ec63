//! Replay data model.
//!
//! A [`ReplayItem`] is one match recording found on disk together with its
//! processing status. Items are identified by file path; the creation time
//! travels with the path so re-created files can be told apart in history.

mod status;
mod types;

pub use status::{StatusCounts, UploadStatus};
pub use types::{ItemEvent, ReplayIdentity, ReplayItem, StoredReplay};
