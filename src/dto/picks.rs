//! Picks view and pick submission shapes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    core::{
        picks::Answer,
        status::{Outcome, StatusKind},
    },
    dto::validation::validate_question_id,
};

/// One question inside the picks view, annotated with settlement state,
/// public sentiment, and the caller's own pick when authenticated.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionView {
    /// Canonical question id.
    pub id: String,
    /// Quarter number.
    pub quarter: u32,
    /// Prompt text.
    pub text: String,
    /// Reconciled status.
    pub status: StatusKind,
    /// Reconciled outcome, when settled.
    pub outcome: Option<Outcome>,
    /// The caller's pick, when authenticated and recorded.
    pub user_pick: Option<Answer>,
    /// Rounded percentage of Yes picks.
    pub yes_percent: u32,
    /// Rounded percentage of No picks.
    pub no_percent: u32,
    /// Whether the caller's pick matches the settled outcome; `None` while
    /// undecided, void, or without a pick.
    pub correct_pick: Option<bool>,
}

/// One game inside the picks view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameView {
    /// Game id (`{roundCode}-G{n}`).
    pub id: String,
    /// Match label.
    pub label: String,
    /// Venue name.
    pub venue: String,
    /// Scheduled start, Rfc3339.
    pub starts_at: String,
    /// Questions in their defined order.
    pub questions: Vec<QuestionView>,
}

/// The picks view for the current round.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PicksViewResponse {
    /// Round number the view is scoped to.
    pub round: u32,
    /// Round code (`OR` or `R{n}`).
    pub round_code: String,
    /// Games in their defined order.
    pub games: Vec<GameView>,
    /// The caller's best streak across the round's games; 0 when
    /// unauthenticated.
    pub current_streak: u32,
    /// The leading best-streak among all pickers.
    pub leader_score: u32,
    /// The leader's user id, when anyone has picks.
    pub leader_name: Option<String>,
}

/// Payload for submitting or replacing a pick.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitPickRequest {
    /// The caller's answer.
    pub answer: Answer,
}

/// Path-bound question id wrapper so axum-valid can run the pattern check.
#[derive(Debug, Deserialize)]
pub struct QuestionIdPath {
    /// Target question id.
    pub question_id: String,
}

impl Validate for QuestionIdPath {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_question_id(&self.question_id) {
            errors.add("question_id", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Acknowledgement for pick writes and clears.
#[derive(Debug, Serialize, ToSchema)]
pub struct PickAck {
    /// Question the write targeted.
    pub question_id: String,
    /// Whether a stored pick remains after the operation.
    pub active: bool,
}
