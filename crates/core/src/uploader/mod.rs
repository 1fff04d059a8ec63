//! Upload Client.
//!
//! Duplicate checks and uploads against the remote ingestion service, plus the
//! optional post-match follow-up that opens the match page once the service
//! has parsed the upload.

mod browser;
mod config;
mod error;
mod http;
mod post_match;
mod traits;
mod types;

pub use browser::{Browser, SystemBrowser};
pub use config::PostMatchConfig;
pub use error::UploadError;
pub use http::HttpUploadClient;
pub use post_match::PostMatchFollowUp;
pub use traits::UploadClient;
pub use types::{DuplicateCheckResponse, UploadResponse};
