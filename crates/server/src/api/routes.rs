use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, replays, settings, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::get_status))
        // Replays
        .route("/replays", get(replays::list_replays))
        .route("/replays/counts", get(replays::get_counts))
        .route("/replays/retry", post(replays::retry_replay))
        .route("/replays/deleted", post(replays::mark_deleted))
        // Feature toggles and manager control
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/manager/start", post(settings::start))
        .route("/manager/stop", post(settings::stop))
        // Live updates
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn(metrics_middleware))
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
