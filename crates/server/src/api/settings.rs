//! Runtime feature toggles and manager control.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

/// Current feature toggles
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub pre_match_enabled: bool,
    pub post_match_enabled: bool,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsBody {
    pub pre_match_enabled: Option<bool>,
    pub post_match_enabled: Option<bool>,
}

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn current(state: &AppState) -> SettingsResponse {
    SettingsResponse {
        pre_match_enabled: state.manager().pre_match_enabled(),
        post_match_enabled: state.manager().post_match_enabled(),
    }
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    Json(current(&state))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateSettingsBody>,
) -> Json<SettingsResponse> {
    if let Some(enabled) = body.pre_match_enabled {
        state.manager().set_pre_match_enabled(enabled);
    }
    if let Some(enabled) = body.post_match_enabled {
        state.manager().set_post_match_enabled(enabled);
    }
    Json(current(&state))
}

/// Start watching and processing
pub async fn start(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.manager().start().await;
    state.ws_broadcaster().manager_status(true);
    info!("Manager started via API");
    Json(MessageResponse {
        message: "Manager started".to_string(),
    })
}

/// Stop watching and processing
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.manager().stop().await;
    state.ws_broadcaster().manager_status(false);
    info!("Manager stopped via API");
    Json(MessageResponse {
        message: "Manager stopped".to_string(),
    })
}
