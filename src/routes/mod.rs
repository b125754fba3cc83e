use axum::Router;

use crate::state::SharedState;

/// Admin endpoints: round management, settlement, maintenance batches.
pub mod admin;
/// Free-kick claim endpoint.
pub mod bonus;
/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Health probe.
pub mod health;
/// Round leaderboard endpoint.
pub mod leaderboard;
/// Picks view and pick writes.
pub mod picks;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(picks::router())
        .merge(leaderboard::router())
        .merge(bonus::router())
        .merge(admin::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
