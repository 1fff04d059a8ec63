//! Pipeline Manager.
//!
//! Owns the live replay collection and the LIFO processing queue, runs the
//! background worker, and wires the file monitor, analyzer, upload client and
//! pre-match processor together.
//!
//! A replay moves `Pending -> InProgress -> <final status>`. Only `Pending`
//! and `UploadError` replays are ever queued; everything else is sticky.

mod collection;
mod config;
mod files;
mod queue;
mod runner;
mod types;

pub use collection::ReplayCollection;
pub use config::{ManagerConfig, RetryPolicy};
pub use files::{copy_with_retry, wait_for_file};
pub use queue::ProcessingQueue;
pub use runner::Manager;
pub use types::{ManagerError, ManagerStatus};
