use serde::{Deserialize, Serialize};

/// A quarter-tagged Yes/No prompt inside a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Quarter number the question refers to.
    pub quarter: u32,
    /// Free-text prompt shown to players.
    pub text: String,
}

/// One match inside a round, with its ordered question list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Match label (e.g. "Tigers v Hawks").
    pub label: String,
    /// Venue name.
    pub venue: String,
    /// Scheduled start in epoch milliseconds.
    pub start_time_ms: i64,
    /// Ordered questions; position within this list drives the question id.
    pub questions: Vec<QuestionEntity>,
}

/// A season-scoped round: an ordered list of games.
///
/// The `_id` composes season and round number, so the pair is unique by
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundEntity {
    /// Composed primary key, `{season}-{number}`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Season year.
    pub season: i32,
    /// Round number; 0 is the opening round.
    pub number: u32,
    /// Ordered games; 1-based position drives the game id.
    pub games: Vec<GameEntity>,
}

impl RoundEntity {
    /// Composed storage key for a round.
    pub fn key(season: i32, number: u32) -> String {
        format!("{season}-{number}")
    }
}

/// Per-season configuration: which round is currently published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeasonConfigEntity {
    /// Season year as string key.
    #[serde(rename = "_id")]
    pub id: String,
    /// Season year.
    pub season: i32,
    /// Currently published round number, if any.
    pub current_round: Option<u32>,
}

/// Raw question-status record. Loose fields mirror what historical writers
/// actually stored; reconciliation cleans them up at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusRecordEntity {
    /// Round the record belongs to.
    pub round: u32,
    /// Question id; may be absent or malformed in legacy data.
    pub question_id: Option<String>,
    /// Loose status string.
    pub status: Option<String>,
    /// Loose outcome string.
    pub outcome: Option<String>,
    /// Write timestamp in epoch milliseconds.
    pub updated_at_ms: Option<i64>,
}

/// One user's answer to one question. The composed `_id` enforces at most
/// one active pick per user per question; upserts overwrite in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickEntity {
    /// Composed primary key, `{user}_{question_id}`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Owning user id.
    pub user: String,
    /// Target question id.
    pub question_id: String,
    /// Round the question belongs to.
    pub round: u32,
    /// Stored answer string, expected `yes` or `no`.
    pub answer: String,
    /// First-write timestamp in epoch milliseconds.
    pub created_at_ms: i64,
    /// Last-write timestamp in epoch milliseconds.
    pub updated_at_ms: i64,
}

impl PickEntity {
    /// Composed storage key for a pick.
    pub fn key(user: &str, question_id: &str) -> String {
        format!("{user}_{question_id}")
    }
}

/// Marker recording that a user consumed their one-per-season bonus action.
/// The unique `_id` makes the claim an atomic insert-if-absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BonusMarkerEntity {
    /// Composed primary key, `{season}_{user}`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Season year.
    pub season: i32,
    /// Claiming user id.
    pub user: String,
    /// Game id the claim targeted.
    pub game_id: String,
    /// Claim timestamp in epoch milliseconds.
    pub claimed_at_ms: i64,
}

impl BonusMarkerEntity {
    /// Composed storage key for a marker.
    pub fn key(season: i32, user: &str) -> String {
        format!("{season}_{user}")
    }
}
