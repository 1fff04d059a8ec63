//! Item Store.
//!
//! Durable history of processed replays, written as a whole-file snapshot.

mod error;
mod json;
mod traits;

pub use error::StoreError;
pub use json::JsonReplayStore;
pub use traits::ReplayStore;
