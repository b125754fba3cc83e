//! Question settlement and the maintenance batches.
//!
//! Settlement writes the canonical status record for a question. The two
//! batches clean up after the rest of the system: lock-started flips open
//! questions of started games to pending, and key repair rewrites
//! malformed or legacy content-hashed ids back onto the canonical
//! positional scheme.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{info, warn};

use crate::{
    core::{
        identity,
        status::{self, QuestionStatus, StatusKind},
    },
    dao::{models::RoundEntity, rounds::RoundRepository, statuses::StatusRepository},
    dto::admin::{LockStartedReport, RepairReport, SettleQuestionRequest},
    error::ServiceError,
    services::{now_ms, round_service},
    state::SharedState,
};

/// Write the canonical status record for one question.
///
/// The round is derived from the id itself so questions of unpublished
/// rounds can be settled. `final` requires an outcome; `void` forces the
/// void outcome; `open` and `pending` carry none.
pub async fn settle_question(
    state: &SharedState,
    question_id: &str,
    request: SettleQuestionRequest,
) -> Result<(), ServiceError> {
    let Some(parts) = identity::parse_question_id(question_id) else {
        return Err(ServiceError::InvalidInput(format!(
            "`{question_id}` is not a valid question id"
        )));
    };
    let Some(round) = identity::round_from_code(&parts.round_code) else {
        return Err(ServiceError::InvalidInput(format!(
            "`{}` is not a valid round code",
            parts.round_code
        )));
    };

    let outcome = match request.status {
        StatusKind::Final => match request.outcome {
            Some(status::Outcome::Void) | None => {
                return Err(ServiceError::InvalidInput(
                    "a final status requires a yes or no outcome".into(),
                ));
            }
            Some(outcome) => Some(outcome),
        },
        StatusKind::Void => Some(status::Outcome::Void),
        StatusKind::Open | StatusKind::Pending => None,
    };

    let mongo = state.require_mongo().await?;
    StatusRepository::new(mongo)
        .upsert_status(
            round,
            question_id,
            request.status.as_str(),
            outcome.map(|o| o.as_str()),
            now_ms(),
        )
        .await?;

    info!(question_id, status = request.status.as_str(), "question settled");
    Ok(())
}

/// Flip every open question of an already-started game of the given
/// round to pending, using the current wall clock as cutoff.
/// Idempotent: questions already pending or settled are left alone.
pub async fn lock_started(
    state: &SharedState,
    round_number: u32,
) -> Result<LockStartedReport, ServiceError> {
    let mongo = state.require_mongo().await?;
    let season = state.config().season;
    let Some(round) = RoundRepository::new(mongo.clone())
        .find(season, round_number)
        .await?
    else {
        return Err(ServiceError::NotFound(format!(
            "round {round_number} does not exist for season {season}"
        )));
    };
    let cutoff_ms = now_ms();

    let repository = StatusRepository::new(mongo);
    let records = repository.for_round(round.number).await?;
    let statuses = status::reconcile(records.into_iter().map(Into::into));

    let locked = lockable_ids(&round, &statuses, cutoff_ms);
    for id in &locked {
        repository
            .upsert_status(
                round.number,
                id,
                StatusKind::Pending.as_str(),
                None,
                cutoff_ms,
            )
            .await?;
    }

    info!(round = round.number, locked = locked.len(), "lock-started batch complete");
    Ok(LockStartedReport::new(round.number, cutoff_ms, locked))
}

/// Question ids of the round that should flip to pending: every question
/// of a game started at or before the cutoff that is still open (or has
/// no status record at all).
fn lockable_ids(
    round: &RoundEntity,
    statuses: &HashMap<String, QuestionStatus>,
    cutoff_ms: i64,
) -> Vec<String> {
    let mut locked = Vec::new();
    for (game, set) in round.games.iter().zip(round_service::question_sets(round)) {
        if game.start_time_ms > cutoff_ms {
            continue;
        }
        for id in set.question_ids {
            let open = statuses
                .get(&id)
                .map(|existing| existing.status == StatusKind::Open)
                .unwrap_or(true);
            if open {
                locked.push(id);
            }
        }
    }
    locked
}

/// Rewrite status records carrying non-canonical question ids onto the
/// positional scheme. Unrecoverable records are counted and left in place.
pub async fn repair_keys(
    state: &SharedState,
    round_number: u32,
) -> Result<RepairReport, ServiceError> {
    let mongo = state.require_mongo().await?;
    let season = state.config().season;
    let Some(round) = RoundRepository::new(mongo.clone())
        .find(season, round_number)
        .await?
    else {
        return Err(ServiceError::NotFound(format!(
            "round {round_number} does not exist for season {season}"
        )));
    };

    let (canonical, content_map) = canonical_id_maps(&round);

    let repository = StatusRepository::new(mongo);
    let records = repository.for_round(round_number).await?;

    // Group stale ids first so duplicates rewrite in one pass each.
    let mut rewrites: BTreeMap<String, String> = BTreeMap::new();
    let mut unrecoverable = 0u64;
    for record in records {
        let Some(id) = record.question_id else {
            unrecoverable += 1;
            continue;
        };
        if canonical.contains(&id) || rewrites.contains_key(&id) {
            continue;
        }
        match resolve_stale_id(&id, &canonical, &content_map) {
            Some(target) => {
                rewrites.insert(id, target);
            }
            None => {
                warn!(question_id = %id, "status record id is unrecoverable");
                unrecoverable += 1;
            }
        }
    }

    let mut rewritten = 0u64;
    for (old_id, new_id) in &rewrites {
        rewritten += repository.rekey(round_number, old_id, new_id).await?;
    }

    info!(round = round_number, rewritten, unrecoverable, "key repair complete");
    Ok(RepairReport {
        rewritten,
        unrecoverable,
    })
}

/// Every canonical positional id of the round, plus the map from the legacy
/// content-derived id of each question to its positional id.
fn canonical_id_maps(round: &RoundEntity) -> (HashSet<String>, HashMap<String, String>) {
    let mut canonical = HashSet::new();
    let mut content_map = HashMap::new();

    for (game, set) in round.games.iter().zip(round_service::question_sets(round)) {
        for (question, positional) in game.questions.iter().zip(&set.question_ids) {
            canonical.insert(positional.clone());
            let legacy = identity::content_question_id(
                round.number,
                &set.game_id,
                question.quarter,
                &question.text,
            );
            content_map.insert(legacy, positional.clone());
        }
    }

    (canonical, content_map)
}

/// Map one stale id onto its canonical positional form.
///
/// Content-hashed ids map through the recomputed hash table; hashes encode
/// the quarter, not the position, so tolerant normalization alone would
/// mis-map them. Other ids go through tolerant normalization, accepted only
/// when the result belongs to the round.
fn resolve_stale_id(
    id: &str,
    canonical: &HashSet<String>,
    content_map: &HashMap<String, String>,
) -> Option<String> {
    if let Some(target) = content_map.get(id) {
        return Some(target.clone());
    }
    if identity::parse_question_id(id).is_some_and(|parts| parts.hash.is_some()) {
        // A well-formed hash id that matches no known question; the prompt
        // was edited after the record was written. Nothing to map onto.
        return None;
    }
    identity::normalize_question_id(id).filter(|normalized| canonical.contains(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{GameEntity, QuestionEntity};

    fn round() -> RoundEntity {
        RoundEntity {
            id: RoundEntity::key(2026, 3),
            season: 2026,
            number: 3,
            games: vec![GameEntity {
                label: "Match".into(),
                venue: "MCG".into(),
                start_time_ms: 0,
                questions: vec![
                    QuestionEntity {
                        quarter: 1,
                        text: "First goal before the 5 minute mark?".into(),
                    },
                    QuestionEntity {
                        quarter: 1,
                        text: "Margin under 10 at quarter time?".into(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn content_hash_ids_map_by_position_not_quarter() {
        let round = round();
        let (canonical, content_map) = canonical_id_maps(&round);

        // Both questions share quarter 1, so their hash ids collide on the
        // quarter segment and only the hash table can tell them apart.
        let second_legacy =
            identity::content_question_id(3, "R3-G1", 1, "Margin under 10 at quarter time?");
        assert_eq!(
            resolve_stale_id(&second_legacy, &canonical, &content_map),
            Some("R3-G1-Q2".to_owned())
        );
    }

    #[test]
    fn malformed_ids_normalize_when_they_belong_to_the_round() {
        let round = round();
        let (canonical, content_map) = canonical_id_maps(&round);

        assert_eq!(
            resolve_stale_id("r3-g1-q2", &canonical, &content_map),
            Some("R3-G1-Q2".to_owned())
        );
        assert_eq!(
            resolve_stale_id(" R3-G1-Q1 ", &canonical, &content_map),
            Some("R3-G1-Q1".to_owned())
        );
    }

    fn two_game_round(first_start_ms: i64, second_start_ms: i64) -> RoundEntity {
        let question = |q: u32| QuestionEntity {
            quarter: q,
            text: format!("Quarter {q} question?"),
        };
        RoundEntity {
            id: RoundEntity::key(2026, 5),
            season: 2026,
            number: 5,
            games: vec![
                GameEntity {
                    label: "Early".into(),
                    venue: "MCG".into(),
                    start_time_ms: first_start_ms,
                    questions: vec![question(1), question(2)],
                },
                GameEntity {
                    label: "Late".into(),
                    venue: "SCG".into(),
                    start_time_ms: second_start_ms,
                    questions: vec![question(1)],
                },
            ],
        }
    }

    #[test]
    fn lockable_ids_target_the_given_round_not_the_published_one() {
        // The batch walks whichever round it is handed; ids carry that
        // round's code.
        let round = two_game_round(1_000, 2_000);
        let locked = lockable_ids(&round, &HashMap::new(), 5_000);
        assert_eq!(locked, vec!["R5-G1-Q1", "R5-G1-Q2", "R5-G2-Q1"]);
    }

    #[test]
    fn lockable_ids_skip_future_games() {
        let round = two_game_round(1_000, 9_000);
        let locked = lockable_ids(&round, &HashMap::new(), 5_000);
        assert_eq!(locked, vec!["R5-G1-Q1", "R5-G1-Q2"]);
    }

    #[test]
    fn lockable_ids_leave_non_open_questions_alone() {
        let round = two_game_round(1_000, 1_000);
        let mut statuses = HashMap::new();
        statuses.insert(
            "R5-G1-Q1".to_owned(),
            QuestionStatus {
                status: StatusKind::Pending,
                outcome: None,
            },
        );
        statuses.insert(
            "R5-G2-Q1".to_owned(),
            QuestionStatus {
                status: StatusKind::Final,
                outcome: Some(status::Outcome::Yes),
            },
        );

        let locked = lockable_ids(&round, &statuses, 5_000);
        assert_eq!(locked, vec!["R5-G1-Q2"]);
    }

    #[test]
    fn foreign_and_garbage_ids_are_unrecoverable() {
        let round = round();
        let (canonical, content_map) = canonical_id_maps(&round);

        // Normalizes fine but belongs to no question of this round.
        assert_eq!(resolve_stale_id("R3-G1-Q9", &canonical, &content_map), None);
        // A hash id whose prompt text no longer exists.
        assert_eq!(
            resolve_stale_id("R3-G1-Q1-zzzzzz", &canonical, &content_map),
            None
        );
        assert_eq!(resolve_stale_id("not-an-id", &canonical, &content_map), None);
    }
}
