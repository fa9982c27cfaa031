use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, instrument, warn};

use super::types::{RegistrationRequest, StartGameResponse};
use crate::config::GameSettings;
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a player before the game starts
///
/// POST /start
/// Returns the validated player, their slot in the current group and the game settings
#[instrument(name = "start_game", skip(state, payload))]
pub async fn start_game(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Json<StartGameResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected registration body");
        AppError::BadRequest("Invalid request".to_string())
    })?;

    let player = request.validate()?;
    let position = state.score_service.current_position().await?;

    info!(
        name = %player.name,
        position = position.position,
        "Player registered"
    );

    Ok(Json(StartGameResponse {
        player,
        position,
        settings: state.game_settings.clone(),
    }))
}

/// HTTP handler for the game tuning values
///
/// GET /settings
pub async fn game_settings(State(state): State<AppState>) -> Json<GameSettings> {
    Json(state.game_settings)
}
