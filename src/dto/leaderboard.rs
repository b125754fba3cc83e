//! Leaderboard shapes.

use serde::Serialize;
use utoipa::ToSchema;

/// One ranked user on the round leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: u32,
    /// User id.
    pub user: String,
    /// Best streak across the round's games.
    pub streak: u32,
}

/// Leaderboard for the current round.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Round the board is scoped to.
    pub round: u32,
    /// Entries sorted by streak descending, ties alphabetical by user id.
    pub entries: Vec<LeaderboardEntry>,
}
