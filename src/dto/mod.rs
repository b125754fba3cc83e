use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Admin round-management and maintenance shapes.
pub mod admin;
/// Free-kick request/response shapes.
pub mod bonus;
/// Health probe response.
pub mod health;
/// Leaderboard shapes.
pub mod leaderboard;
/// Picks view and submission shapes.
pub mod picks;
/// Custom validators shared by DTOs.
pub mod validation;

/// Format an epoch-milliseconds timestamp as Rfc3339 for display fields.
pub(crate) fn format_millis(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}
