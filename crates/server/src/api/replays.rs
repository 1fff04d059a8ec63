//! Replay collection API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use replaylink_core::{ManagerError, ReplayItem, StatusCounts, UploadStatus};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing replays
#[derive(Debug, Deserialize)]
pub struct ListReplaysParams {
    /// Only replays in this status (case-insensitive)
    pub status: Option<String>,
    /// Maximum number of replays to return
    pub limit: Option<usize>,
}

/// Response for listing replays
#[derive(Debug, Serialize)]
pub struct ListReplaysResponse {
    pub replays: Vec<ReplayItem>,
    pub total: usize,
}

/// Request body naming a single replay
#[derive(Debug, Deserialize)]
pub struct ReplayPathBody {
    pub path: PathBuf,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ReplayErrorResponse {
    pub error: String,
}

fn error_response(
    status: StatusCode,
    error: impl ToString,
) -> (StatusCode, Json<ReplayErrorResponse>) {
    (
        status,
        Json(ReplayErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn manager_error_response(e: ManagerError) -> (StatusCode, Json<ReplayErrorResponse>) {
    let status = match &e {
        ManagerError::NotFound(_) => StatusCode::NOT_FOUND,
        ManagerError::NotRetryable { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e)
}

// ============================================================================
// Handlers
// ============================================================================

/// List tracked replays, newest first
pub async fn list_replays(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListReplaysParams>,
) -> Result<Json<ListReplaysResponse>, impl IntoResponse> {
    let filter = match params.status.as_deref() {
        Some(raw) => match raw.parse::<UploadStatus>() {
            Ok(status) => Some(status),
            Err(e) => return Err(error_response(StatusCode::BAD_REQUEST, e)),
        },
        None => None,
    };

    let mut replays = state.manager().items().await;
    if let Some(status) = filter {
        replays.retain(|item| item.status == status);
    }
    let total = replays.len();
    if let Some(limit) = params.limit {
        replays.truncate(limit);
    }

    Ok(Json(ListReplaysResponse { replays, total }))
}

/// Number of replays in each status
pub async fn get_counts(State(state): State<Arc<AppState>>) -> Json<StatusCounts> {
    Json(state.manager().counts().await)
}

/// Queue a failed or pending replay for another attempt
pub async fn retry_replay(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReplayPathBody>,
) -> Result<(StatusCode, Json<ReplayItem>), impl IntoResponse> {
    match state.manager().retry(&body.path).await {
        Ok(item) => Ok((StatusCode::ACCEPTED, Json(item))),
        Err(e) => Err(manager_error_response(e)),
    }
}

/// Flag a replay whose file was removed
pub async fn mark_deleted(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReplayPathBody>,
) -> Result<Json<ReplayItem>, impl IntoResponse> {
    state
        .manager()
        .mark_deleted(&body.path)
        .await
        .map(Json)
        .map_err(manager_error_response)
}
