//! Bonus-action ("free kick") gating.
//!
//! A player may claim one compensating action per season, and only for a
//! match where every question they picked is settled and at least one pick
//! was wrong. This module evaluates the pick/settlement preconditions; the
//! already-used and match-exists checks live in the service layer where the
//! store is available.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::core::{
    picks::Answer,
    status::{Outcome, QuestionStatus},
};

/// Machine-readable reason a bonus-action request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GateRejection {
    /// Caller could not be resolved to a user identity.
    Unauthenticated,
    /// The one-per-season allowance is already consumed.
    AlreadyUsed,
    /// The target match does not exist in the round.
    MatchNotFound,
    /// The caller has no recorded pick in the match.
    NoPicks,
    /// At least one picked question is not settled yet.
    NotSettled,
    /// Every settled, non-void pick was correct; nothing to compensate.
    NoLoss,
}

impl GateRejection {
    /// Stable reason code carried in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            GateRejection::Unauthenticated => "unauthenticated",
            GateRejection::AlreadyUsed => "already_used",
            GateRejection::MatchNotFound => "match_not_found",
            GateRejection::NoPicks => "no_picks",
            GateRejection::NotSettled => "not_settled",
            GateRejection::NoLoss => "no_loss",
        }
    }

    /// Human-readable message matching the reason code.
    pub fn message(&self) -> &'static str {
        match self {
            GateRejection::Unauthenticated => "sign in to use the free kick",
            GateRejection::AlreadyUsed => "free kick already used this season",
            GateRejection::MatchNotFound => "match not found in the current round",
            GateRejection::NoPicks => "no picks recorded for this match",
            GateRejection::NotSettled => "not every picked question is settled yet",
            GateRejection::NoLoss => "no lost pick in this match to compensate",
        }
    }
}

/// Evaluate the pick/settlement preconditions for one match.
///
/// `match_question_ids` is the match's full question list; `user_picks` the
/// caller's pick map for the round. Checks run in order: the caller must
/// have at least one pick in the match, every picked question must be
/// settled (final or void), and at least one non-void settled pick must be
/// wrong.
pub fn evaluate(
    match_question_ids: &[String],
    statuses: &HashMap<String, QuestionStatus>,
    user_picks: &HashMap<String, Answer>,
) -> Result<(), GateRejection> {
    let picked: Vec<(&String, Answer)> = match_question_ids
        .iter()
        .filter_map(|id| user_picks.get(id).map(|answer| (id, *answer)))
        .collect();

    if picked.is_empty() {
        return Err(GateRejection::NoPicks);
    }

    let all_settled = picked.iter().all(|(id, _)| {
        statuses
            .get(id.as_str())
            .is_some_and(QuestionStatus::is_settled)
    });
    if !all_settled {
        return Err(GateRejection::NotSettled);
    }

    let lost_one = picked.iter().any(|(id, answer)| {
        let Some(status) = statuses.get(id.as_str()) else {
            return false;
        };
        if status.is_void() {
            return false;
        }
        match status.outcome {
            Some(Outcome::Yes) => *answer != Answer::Yes,
            Some(Outcome::No) => *answer != Answer::No,
            _ => false,
        }
    });
    if !lost_one {
        return Err(GateRejection::NoLoss);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::StatusKind;

    fn status(kind: StatusKind, outcome: Option<Outcome>) -> QuestionStatus {
        QuestionStatus {
            status: kind,
            outcome,
        }
    }

    fn fixture() -> (Vec<String>, HashMap<String, QuestionStatus>) {
        let ids: Vec<String> = (1..=4).map(|i| format!("R3-G2-Q{i}")).collect();
        let mut statuses = HashMap::new();
        statuses.insert(ids[0].clone(), status(StatusKind::Final, Some(Outcome::No)));
        statuses.insert(ids[1].clone(), status(StatusKind::Final, Some(Outcome::No)));
        statuses.insert(
            ids[2].clone(),
            status(StatusKind::Void, Some(Outcome::Void)),
        );
        statuses.insert(ids[3].clone(), status(StatusKind::Open, None));
        (ids, statuses)
    }

    #[test]
    fn rejects_without_picks() {
        let (ids, statuses) = fixture();
        assert_eq!(
            evaluate(&ids, &statuses, &HashMap::new()),
            Err(GateRejection::NoPicks)
        );
    }

    #[test]
    fn rejects_while_a_picked_question_is_open() {
        let (ids, statuses) = fixture();
        // Picks yes on three settled questions plus the still-open fourth.
        let picks: HashMap<String, Answer> =
            ids.iter().map(|id| (id.clone(), Answer::Yes)).collect();
        assert_eq!(
            evaluate(&ids, &statuses, &picks),
            Err(GateRejection::NotSettled)
        );
    }

    #[test]
    fn succeeds_once_settled_with_a_loss() {
        let (ids, statuses) = fixture();
        // Only the three settled questions are picked; two are wrong, one void.
        let picks: HashMap<String, Answer> = ids[..3]
            .iter()
            .map(|id| (id.clone(), Answer::Yes))
            .collect();
        assert_eq!(evaluate(&ids, &statuses, &picks), Ok(()));
    }

    #[test]
    fn rejects_when_every_pick_won_or_voided() {
        let (ids, statuses) = fixture();
        let picks: HashMap<String, Answer> = ids[..3]
            .iter()
            .map(|id| (id.clone(), Answer::No))
            .collect();
        assert_eq!(
            evaluate(&ids, &statuses, &picks),
            Err(GateRejection::NoLoss)
        );
    }

    #[test]
    fn void_only_picks_cannot_claim() {
        let (ids, statuses) = fixture();
        let picks: HashMap<String, Answer> =
            [(ids[2].clone(), Answer::Yes)].into_iter().collect();
        assert_eq!(
            evaluate(&ids, &statuses, &picks),
            Err(GateRejection::NoLoss)
        );
    }

    #[test]
    fn reason_codes_are_stable() {
        assert_eq!(GateRejection::AlreadyUsed.code(), "already_used");
        assert_eq!(GateRejection::NotSettled.code(), "not_settled");
        assert_eq!(GateRejection::NoLoss.code(), "no_loss");
    }
}
