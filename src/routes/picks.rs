//! The picks surface: the round view and pick writes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use axum_valid::Valid;

use crate::{
    auth::{AuthUser, OptionalUser},
    dto::picks::{PickAck, PicksViewResponse, QuestionIdPath, SubmitPickRequest},
    error::AppError,
    services::picks_service,
    state::SharedState,
};

/// Public and player-facing pick endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/rounds/current/picks", get(current_picks))
        .route(
            "/api/picks/{question_id}",
            put(put_pick).delete(delete_pick),
        )
}

/// Retrieve the picks view for the published round. Works without a bearer
/// token; an authenticated caller additionally sees their own picks and
/// streak.
#[utoipa::path(
    get,
    path = "/api/rounds/current/picks",
    tag = "picks",
    responses(
        (status = 200, description = "Picks view for the published round", body = PicksViewResponse),
        (status = 404, description = "No published round"),
    )
)]
pub async fn current_picks(
    State(state): State<SharedState>,
    OptionalUser(user): OptionalUser,
) -> Result<Json<PicksViewResponse>, AppError> {
    let view = picks_service::current_view(&state, user.as_deref()).await?;
    Ok(Json(view))
}

/// Record or replace the caller's pick for a question.
#[utoipa::path(
    put,
    path = "/api/picks/{question_id}",
    tag = "picks",
    params(("question_id" = String, Path, description = "Canonical question id")),
    request_body = SubmitPickRequest,
    responses(
        (status = 200, description = "Pick recorded", body = PickAck),
        (status = 400, description = "Invalid id, locked question, or foreign round"),
        (status = 401, description = "Missing or invalid bearer token"),
    )
)]
pub async fn put_pick(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Valid(Path(path)): Valid<Path<QuestionIdPath>>,
    Json(payload): Json<SubmitPickRequest>,
) -> Result<Json<PickAck>, AppError> {
    let ack = picks_service::put_pick(&state, &user, &path.question_id, payload).await?;
    Ok(Json(ack))
}

/// Clear the caller's active pick for a question.
#[utoipa::path(
    delete,
    path = "/api/picks/{question_id}",
    tag = "picks",
    params(("question_id" = String, Path, description = "Canonical question id")),
    responses(
        (status = 200, description = "Pick cleared", body = PickAck),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "No active pick for this question"),
    )
)]
pub async fn delete_pick(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Valid(Path(path)): Valid<Path<QuestionIdPath>>,
) -> Result<Json<PickAck>, AppError> {
    let ack = picks_service::clear_pick(&state, &user, &path.question_id).await?;
    Ok(Json(ack))
}
