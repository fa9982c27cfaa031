use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, instrument, warn};

use super::{
    models::GroupPosition,
    types::{GroupMemberResponse, LeaderboardGroup, SaveScoreRequest, StatusResponse},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for submitting a finished game
///
/// POST /save_score
/// Body: `{name, phone, age, score, avg_reaction}`
#[instrument(name = "save_score", skip(state, payload))]
pub async fn save_score(
    State(state): State<AppState>,
    payload: Result<Json<SaveScoreRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "Rejected score submission body");
        AppError::BadRequest("Invalid request".to_string())
    })?;

    let result = request.into_result()?;
    info!(name = %result.name, score = result.score, "Saving score");

    state
        .score_service
        .record_result(result)
        .await
        .map_err(AppError::save_failed)?;

    Ok(Json(StatusResponse::success()))
}

/// HTTP handler for the slot the next player will take
///
/// GET /position
/// Falls back to the first slot when the player log cannot be read
#[instrument(name = "current_position", skip(state))]
pub async fn current_position(State(state): State<AppState>) -> Json<GroupPosition> {
    let position = state
        .score_service
        .current_position()
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Could not read player log, assuming empty group");
            GroupPosition {
                position: 1,
                remaining: 4,
            }
        });

    Json(position)
}

/// HTTP handler for the winners leaderboard
///
/// GET /leaderboard
/// Returns completed groups, newest first
#[instrument(name = "leaderboard", skip(state))]
pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardGroup>>, AppError> {
    let records = state.score_service.list_winner_groups().await?;
    let total = records.len();

    let groups: Vec<LeaderboardGroup> = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| LeaderboardGroup {
            group: total - i,
            winner: record.winner,
            players: record.players,
        })
        .collect();

    info!(group_count = groups.len(), "Leaderboard listed");
    Ok(Json(groups))
}

/// HTTP handler for results in the group that is still filling up
///
/// GET /group/current
#[instrument(name = "current_group", skip(state))]
pub async fn current_group(
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupMemberResponse>>, AppError> {
    let results = state.score_service.current_group_results().await?;
    Ok(Json(results.into_iter().map(Into::into).collect()))
}
