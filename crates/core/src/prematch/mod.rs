//! Pre-Match Processor.
//!
//! Reads participants from a lobby file, submits them to the pre-match
//! endpoint and opens the resulting page.

mod error;
mod processor;
mod types;

pub use error::PreMatchError;
pub use processor::PreMatchProcessor;
pub use types::PrematchPlayer;
