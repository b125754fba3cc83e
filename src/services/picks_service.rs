//! Picks view assembly and pick writes.
//!
//! The view is the product's main screen: every question of the published
//! round annotated with settlement state, public sentiment, the caller's
//! own picks, and the round's streak figures. Each store sub-fetch is
//! independently fault-tolerant: a failed fetch degrades its slice of the
//! view to empty instead of failing the request.

use std::collections::HashMap;

use tracing::warn;

use crate::{
    core::{
        picks::{self, Answer, PickRecord, PickSet},
        status::{self, QuestionStatus, StatusKind},
        streak,
    },
    dao::{picks::PickRepository, statuses::StatusRepository},
    dto::picks::{GameView, PickAck, PicksViewResponse, QuestionView, SubmitPickRequest},
    error::ServiceError,
    services::{now_ms, round_service},
    state::SharedState,
};

/// Assemble the picks view for the published round.
///
/// `caller` personalizes the view; `None` yields the sentiment-only view.
pub async fn current_view(
    state: &SharedState,
    caller: Option<&str>,
) -> Result<PicksViewResponse, ServiceError> {
    let round = round_service::current_round(state).await?;
    let sets = round_service::question_sets(&round);
    let all_ids: Vec<String> = sets
        .iter()
        .flat_map(|set| set.question_ids.iter().cloned())
        .collect();

    let mongo = state.require_mongo().await?;
    let status_repo = StatusRepository::new(mongo.clone());
    let pick_repo = PickRepository::new(mongo);

    // Both fetches depend only on the id set; run them concurrently and
    // degrade each one independently.
    let (status_result, picks_result) = tokio::join!(
        status_repo.for_round(round.number),
        pick_repo.for_questions(&all_ids),
    );

    let statuses = match status_result {
        Ok(records) => status::reconcile(records.into_iter().map(Into::into)),
        Err(err) => {
            warn!(round = round.number, error = %err, "status fetch failed; degrading to empty");
            HashMap::new()
        }
    };
    let pick_set = match picks_result {
        Ok(records) => picks::aggregate(records.into_iter().map(PickRecord::from)),
        Err(err) => {
            warn!(round = round.number, error = %err, "pick fetch failed; degrading to empty");
            PickSet::default()
        }
    };

    let rule = state.config().missing_pick_rule;
    let games_ids: Vec<Vec<String>> = sets.iter().map(|set| set.question_ids.clone()).collect();

    let caller_picks = caller.map(|user| pick_set.picks_of(user)).unwrap_or_default();
    let current_streak = if caller.is_some() {
        streak::best_streak_across_games(&games_ids, &statuses, &caller_picks, rule)
    } else {
        0
    };

    let leader = streak::leader(&games_ids, &statuses, &pick_set.by_user, rule);
    let (leader_score, leader_name) = match leader {
        Some(leader) => (leader.streak, Some(leader.user)),
        None => (0, None),
    };

    let games = round
        .games
        .iter()
        .zip(sets.iter())
        .map(|(game, set)| GameView {
            id: set.game_id.clone(),
            label: game.label.clone(),
            venue: game.venue.clone(),
            starts_at: crate::dto::format_millis(game.start_time_ms),
            questions: game
                .questions
                .iter()
                .zip(set.question_ids.iter())
                .map(|(question, id)| {
                    question_view(id, question.quarter, &question.text, &statuses, &pick_set, &caller_picks)
                })
                .collect(),
        })
        .collect();

    Ok(PicksViewResponse {
        round: round.number,
        round_code: crate::core::identity::round_code(round.number),
        games,
        current_streak,
        leader_score,
        leader_name,
    })
}

fn question_view(
    id: &str,
    quarter: u32,
    text: &str,
    statuses: &HashMap<String, QuestionStatus>,
    pick_set: &PickSet,
    caller_picks: &HashMap<String, Answer>,
) -> QuestionView {
    // Questions without a settlement record are open by definition.
    let status = statuses.get(id).copied().unwrap_or(QuestionStatus {
        status: StatusKind::Open,
        outcome: None,
    });
    let tally = pick_set.tallies.get(id).copied().unwrap_or_default();
    let user_pick = caller_picks.get(id).copied();

    let correct_pick = match (user_pick, status.outcome) {
        _ if !status.is_settled() || status.is_void() => None,
        (Some(pick), Some(outcome)) => match outcome {
            crate::core::status::Outcome::Yes => Some(pick == Answer::Yes),
            crate::core::status::Outcome::No => Some(pick == Answer::No),
            crate::core::status::Outcome::Void => None,
        },
        _ => None,
    };

    QuestionView {
        id: id.to_owned(),
        quarter,
        text: text.to_owned(),
        status: status.status,
        outcome: status.outcome,
        user_pick,
        yes_percent: tally.yes_percent(),
        no_percent: tally.no_percent(),
        correct_pick,
    }
}

/// Record or replace the caller's pick for a question in the published
/// round. The question must belong to the round and still be open.
pub async fn put_pick(
    state: &SharedState,
    user: &str,
    question_id: &str,
    request: SubmitPickRequest,
) -> Result<PickAck, ServiceError> {
    let round = round_service::current_round(state).await?;
    let ids = round_service::all_question_ids(&round);
    if !ids.iter().any(|id| id == question_id) {
        return Err(ServiceError::InvalidInput(format!(
            "question `{question_id}` is not part of the current round"
        )));
    }

    let mongo = state.require_mongo().await?;
    let status_repo = StatusRepository::new(mongo.clone());
    let target = [question_id.to_owned()];
    let records = status_repo.for_questions(round.number, &target).await?;
    let statuses = status::reconcile(records.into_iter().map(Into::into));
    if let Some(existing) = statuses.get(question_id)
        && existing.status != StatusKind::Open
    {
        return Err(ServiceError::InvalidInput(format!(
            "question `{question_id}` is locked"
        )));
    }

    PickRepository::new(mongo)
        .upsert(user, round.number, question_id, request.answer, now_ms())
        .await?;

    Ok(PickAck {
        question_id: question_id.to_owned(),
        active: true,
    })
}

/// Clear the caller's active pick for a question.
pub async fn clear_pick(
    state: &SharedState,
    user: &str,
    question_id: &str,
) -> Result<PickAck, ServiceError> {
    let mongo = state.require_mongo().await?;
    let existed = PickRepository::new(mongo).delete(user, question_id).await?;
    if !existed {
        return Err(ServiceError::NotFound(format!(
            "no active pick for `{question_id}`"
        )));
    }
    Ok(PickAck {
        question_id: question_id.to_owned(),
        active: false,
    })
}
