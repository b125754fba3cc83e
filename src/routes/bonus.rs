use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;

use crate::{
    auth::OptionalUser,
    dto::bonus::{FreeKickRequest, FreeKickResponse},
    error::AppError,
    services::bonus_service,
    state::SharedState,
};

/// Bonus-action endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/bonus/free-kick", post(claim_free_kick))
}

/// Claim the caller's one-per-season free kick against a match of the
/// published round. Rejections carry a stable `code` field.
#[utoipa::path(
    post,
    path = "/api/bonus/free-kick",
    tag = "bonus",
    request_body = FreeKickRequest,
    responses(
        (status = 200, description = "Free kick claimed", body = FreeKickResponse),
        (status = 401, description = "No usable bearer token (code `unauthenticated`)"),
        (status = 404, description = "Match or published round not found"),
        (status = 409, description = "Gate rejection: already used, picks unsettled, or no loss"),
    )
)]
pub async fn claim_free_kick(
    State(state): State<SharedState>,
    OptionalUser(user): OptionalUser,
    Valid(Json(payload)): Valid<Json<FreeKickRequest>>,
) -> Result<Json<FreeKickResponse>, AppError> {
    let claim = bonus_service::claim_free_kick(&state, user.as_deref(), payload).await?;
    Ok(Json(claim))
}
