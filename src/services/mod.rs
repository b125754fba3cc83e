use std::time::{SystemTime, UNIX_EPOCH};

/// Free-kick claim orchestration.
pub mod bonus_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Round leaderboard assembly.
pub mod leaderboard_service;
/// Picks view assembly and pick writes.
pub mod picks_service;
/// Round management and the published-round pointer.
pub mod round_service;
/// Question settlement and maintenance batches.
pub mod settlement_service;

/// Current wall-clock time in epoch milliseconds, the storage timestamp
/// unit.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
