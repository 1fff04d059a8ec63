//! File Monitor.
//!
//! Three independently switchable watch channels over the game's directories,
//! plus enumeration of the match recordings already on disk.

mod error;
mod scan;
mod traits;
mod types;
mod watcher;

pub use error::MonitorError;
pub use scan::{identify, scan_directory};
pub use traits::FileMonitor;
pub use types::{MonitorEvent, WatchChannel};
pub use watcher::NotifyMonitor;
