use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the STREAKr backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::picks::current_picks,
        crate::routes::picks::put_pick,
        crate::routes::picks::delete_pick,
        crate::routes::leaderboard::current_leaderboard,
        crate::routes::bonus::claim_free_kick,
        crate::routes::admin::list_rounds,
        crate::routes::admin::upsert_round,
        crate::routes::admin::publish_round,
        crate::routes::admin::lock_started,
        crate::routes::admin::repair_keys,
        crate::routes::admin::settle_question,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::picks::PicksViewResponse,
            crate::dto::picks::GameView,
            crate::dto::picks::QuestionView,
            crate::dto::picks::SubmitPickRequest,
            crate::dto::picks::PickAck,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::bonus::FreeKickRequest,
            crate::dto::bonus::FreeKickResponse,
            crate::dto::admin::UpsertRoundRequest,
            crate::dto::admin::GameInput,
            crate::dto::admin::QuestionInput,
            crate::dto::admin::SettleQuestionRequest,
            crate::dto::admin::RoundSummary,
            crate::dto::admin::LockStartedReport,
            crate::dto::admin::RepairReport,
            crate::dto::admin::ActionResponse,
            crate::core::picks::Answer,
            crate::core::status::StatusKind,
            crate::core::status::Outcome,
            crate::core::gate::GateRejection,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "picks", description = "Round picks view and pick writes"),
        (name = "leaderboard", description = "Round leaderboards"),
        (name = "bonus", description = "One-per-season bonus actions"),
        (name = "admin", description = "Round management, settlement, and maintenance"),
    )
)]
pub struct ApiDoc;
