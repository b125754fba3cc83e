use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::leaderboard::LeaderboardResponse, error::AppError, services::leaderboard_service,
    state::SharedState,
};

/// Leaderboard endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/rounds/current/leaderboard", get(current_leaderboard))
}

/// Retrieve the leaderboard for the published round.
#[utoipa::path(
    get,
    path = "/api/rounds/current/leaderboard",
    tag = "leaderboard",
    responses(
        (status = 200, description = "Leaderboard for the published round", body = LeaderboardResponse),
        (status = 404, description = "No published round"),
    )
)]
pub async fn current_leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let board = leaderboard_service::current_leaderboard(&state).await?;
    Ok(Json(board))
}
