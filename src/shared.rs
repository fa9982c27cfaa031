use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::config::GameSettings;
use crate::scores::{ScoreError, ScoreService};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub score_service: Arc<ScoreService>,
    pub game_settings: GameSettings,
}

impl AppState {
    pub fn new(score_service: Arc<ScoreService>, game_settings: GameSettings) -> Self {
        Self {
            score_service,
            game_settings,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Failed to save score")]
    SaveFailed,

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Maps a failed recording: storage failures become the generic save error
    pub fn save_failed(err: ScoreError) -> Self {
        match AppError::from(err) {
            AppError::Internal => AppError::SaveFailed,
            other => other,
        }
    }
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        match &err {
            ScoreError::Validation(msg) => AppError::BadRequest(msg.clone()),
            ScoreError::Persist(_) | ScoreError::Parse(_) => {
                error!(error = %err, "Score storage failure");
                AppError::Internal
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::SaveFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save score".to_string(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "status": "error",
            "message": message
        }));

        (status, body).into_response()
    }
}
