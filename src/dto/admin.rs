//! Admin request/response shapes: round management, settlement, and
//! maintenance jobs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{core::status::Outcome, dao::models::RoundEntity, dto::format_millis};

/// Incoming question definition for a round upsert.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct QuestionInput {
    /// Quarter number (1-based).
    #[validate(range(min = 1, max = 4))]
    pub quarter: u32,
    /// Prompt text.
    #[validate(length(min = 1))]
    pub text: String,
}

/// Incoming game definition for a round upsert.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct GameInput {
    /// Match label.
    #[validate(length(min = 1))]
    pub label: String,
    /// Venue name.
    #[validate(length(min = 1))]
    pub venue: String,
    /// Scheduled start in epoch milliseconds.
    pub start_time_ms: i64,
    /// Ordered questions.
    #[validate(nested, length(min = 1))]
    pub questions: Vec<QuestionInput>,
}

/// Payload to create or replace a round definition.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpsertRoundRequest {
    /// Round number; 0 is the opening round.
    pub number: u32,
    /// Ordered games.
    #[validate(nested, length(min = 1))]
    pub games: Vec<GameInput>,
}

/// Payload to lock or settle one question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SettleQuestionRequest {
    /// New status.
    pub status: crate::core::status::StatusKind,
    /// Outcome; required when status is `final`, forced to `void` when
    /// status is `void`.
    pub outcome: Option<Outcome>,
}

/// Summary of a stored round.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundSummary {
    /// Round number.
    pub number: u32,
    /// Round code.
    pub round_code: String,
    /// Number of games.
    pub games: usize,
    /// Number of questions across all games.
    pub questions: usize,
    /// Whether this is the published round.
    pub current: bool,
}

impl RoundSummary {
    /// Build a summary from a stored round and the published pointer.
    pub fn from_entity(entity: &RoundEntity, current_round: Option<u32>) -> Self {
        Self {
            number: entity.number,
            round_code: crate::core::identity::round_code(entity.number),
            games: entity.games.len(),
            questions: entity.games.iter().map(|g| g.questions.len()).sum(),
            current: current_round == Some(entity.number),
        }
    }
}

/// Result of the lock-started batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct LockStartedReport {
    /// Round the batch ran against.
    pub round: u32,
    /// Cutoff used for the batch, Rfc3339.
    pub cutoff: String,
    /// Question ids newly marked pending.
    pub locked: Vec<String>,
}

impl LockStartedReport {
    /// Build a report from the target round, the cutoff timestamp, and
    /// the locked ids.
    pub fn new(round: u32, cutoff_ms: i64, locked: Vec<String>) -> Self {
        Self {
            round,
            cutoff: format_millis(cutoff_ms),
            locked,
        }
    }
}

/// Result of the key-repair batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct RepairReport {
    /// Records rewritten onto canonical positional ids.
    pub rewritten: u64,
    /// Records whose id could not be recovered; left untouched.
    pub unrecoverable: u64,
}

/// Generic acknowledgement for admin actions.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable confirmation.
    pub message: String,
}
