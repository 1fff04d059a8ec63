use std::sync::Arc;

use replaylink_core::{Config, Manager};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    manager: Arc<Manager>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(config: Config, manager: Arc<Manager>, ws_broadcaster: WsBroadcaster) -> Self {
        Self {
            config,
            manager,
            ws_broadcaster,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
