//! Admin endpoints: round management, settlement, and maintenance jobs.
//!
//! Protected by a shared token in the `X-Admin-Token` header. When no
//! token is configured the whole subtree rejects.

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        admin::{
            ActionResponse, LockStartedReport, RepairReport, RoundSummary, SettleQuestionRequest,
            UpsertRoundRequest,
        },
        picks::QuestionIdPath,
    },
    error::AppError,
    services::{round_service, settlement_service},
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin-only management endpoints.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/rounds", get(list_rounds).put(upsert_round))
        .route("/admin/rounds/{number}/publish", post(publish_round))
        .route("/admin/rounds/{number}/lock-started", post(lock_started))
        .route("/admin/rounds/{number}/repair-keys", post(repair_keys))
        .route("/admin/questions/{question_id}/settle", post(settle_question))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// List every round of the season.
#[utoipa::path(
    get,
    path = "/admin/rounds",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Shared admin token")),
    responses((status = 200, description = "Rounds of the season", body = [RoundSummary]))
)]
pub async fn list_rounds(
    State(state): State<SharedState>,
) -> Result<Json<Vec<RoundSummary>>, AppError> {
    Ok(Json(round_service::list_rounds(&state).await?))
}

/// Create or replace a round definition.
#[utoipa::path(
    put,
    path = "/admin/rounds",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Shared admin token")),
    request_body = UpsertRoundRequest,
    responses((status = 200, description = "Round stored", body = RoundSummary))
)]
pub async fn upsert_round(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<UpsertRoundRequest>>,
) -> Result<Json<RoundSummary>, AppError> {
    Ok(Json(round_service::upsert_round(&state, payload).await?))
}

/// Publish a round as the season's current round.
#[utoipa::path(
    post,
    path = "/admin/rounds/{number}/publish",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Shared admin token"),
    ("number" = u32, Path, description = "Round number to publish")),
    responses(
        (status = 200, description = "Round published", body = ActionResponse),
        (status = 404, description = "Round does not exist"),
    )
)]
pub async fn publish_round(
    State(state): State<SharedState>,
    Path(number): Path<u32>,
) -> Result<Json<ActionResponse>, AppError> {
    round_service::publish_round(&state, number).await?;
    Ok(Json(ActionResponse {
        message: format!("round {number} published"),
    }))
}

/// Flip every open question of an already-started game to pending.
#[utoipa::path(
    post,
    path = "/admin/rounds/{number}/lock-started",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Shared admin token"),
    ("number" = u32, Path, description = "Round number to lock")),
    responses(
        (status = 200, description = "Batch complete", body = LockStartedReport),
        (status = 404, description = "Round does not exist"),
    )
)]
pub async fn lock_started(
    State(state): State<SharedState>,
    Path(number): Path<u32>,
) -> Result<Json<LockStartedReport>, AppError> {
    Ok(Json(settlement_service::lock_started(&state, number).await?))
}

/// Rewrite malformed or legacy status-record ids onto the canonical scheme.
#[utoipa::path(
    post,
    path = "/admin/rounds/{number}/repair-keys",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Shared admin token"),
    ("number" = u32, Path, description = "Round number to repair")),
    responses(
        (status = 200, description = "Repair complete", body = RepairReport),
        (status = 404, description = "Round does not exist"),
    )
)]
pub async fn repair_keys(
    State(state): State<SharedState>,
    Path(number): Path<u32>,
) -> Result<Json<RepairReport>, AppError> {
    Ok(Json(settlement_service::repair_keys(&state, number).await?))
}

/// Lock or settle one question.
#[utoipa::path(
    post,
    path = "/admin/questions/{question_id}/settle",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Shared admin token"),
    ("question_id" = String, Path, description = "Canonical question id")),
    request_body = SettleQuestionRequest,
    responses(
        (status = 200, description = "Status recorded", body = ActionResponse),
        (status = 400, description = "Invalid id or status/outcome combination"),
    )
)]
pub async fn settle_question(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<QuestionIdPath>>,
    Json(payload): Json<SettleQuestionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    settlement_service::settle_question(&state, &path.question_id, payload).await?;
    Ok(Json(ActionResponse {
        message: format!("question {} updated", path.question_id),
    }))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    match state.admin_token() {
        Some(expected) if expected == provided => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid admin token".into())),
        None => Err(AppError::Unauthorized(
            "admin endpoints disabled: no token configured".into(),
        )),
    }
}
