use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{registration, scores, shared::AppState};

/// Builds the HTTP router with all routes, tracing and CORS layers
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/start", post(registration::start_game))
        .route("/settings", get(registration::game_settings))
        .route("/save_score", post(scores::save_score))
        .route("/position", get(scores::current_position))
        .route("/leaderboard", get(scores::leaderboard))
        .route("/group/current", get(scores::current_group))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
