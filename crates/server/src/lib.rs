//! Local HTTP and WebSocket surface for the replay uploader.

pub mod api;
pub mod metrics;
pub mod state;
