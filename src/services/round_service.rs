//! Round management: definitions, the published-round pointer, and the
//! id structure every other service walks.

use crate::{
    core::identity,
    dao::{
        models::{GameEntity, QuestionEntity, RoundEntity},
        rounds::RoundRepository,
    },
    dto::admin::{RoundSummary, UpsertRoundRequest},
    error::ServiceError,
    state::SharedState,
};

/// The id structure of one game: its game id and ordered question ids.
#[derive(Debug, Clone)]
pub struct GameQuestions {
    /// Game id (`{roundCode}-G{n}`).
    pub game_id: String,
    /// Canonical question ids in question order.
    pub question_ids: Vec<String>,
}

/// Walk a round definition and assign canonical positional ids to every
/// game and question. This is the single place id composition happens on
/// the read side; consumers must not re-derive ids themselves.
pub fn question_sets(round: &RoundEntity) -> Vec<GameQuestions> {
    round
        .games
        .iter()
        .enumerate()
        .map(|(game_index, game)| {
            let game_position = (game_index + 1) as u32;
            let game_id = identity::game_id(round.number, game_position);
            let question_ids = (1..=game.questions.len() as u32)
                .map(|position| identity::positional_question_id(round.number, game_position, position))
                .collect();
            GameQuestions {
                game_id,
                question_ids,
            }
        })
        .collect()
}

/// Every question id of a round, in round order.
pub fn all_question_ids(round: &RoundEntity) -> Vec<String> {
    question_sets(round)
        .into_iter()
        .flat_map(|set| set.question_ids)
        .collect()
}

/// Load the published round for the configured season.
pub async fn current_round(state: &SharedState) -> Result<RoundEntity, ServiceError> {
    let mongo = state.require_mongo().await?;
    let season = state.config().season;
    let repository = RoundRepository::new(mongo);

    let Some(number) = repository.current_round(season).await? else {
        return Err(ServiceError::NotFound(format!(
            "no published round for season {season}"
        )));
    };
    repository.find(season, number).await?.ok_or_else(|| {
        ServiceError::NotFound(format!("round {number} missing for season {season}"))
    })
}

/// List all rounds of the season with their summary stats.
pub async fn list_rounds(state: &SharedState) -> Result<Vec<RoundSummary>, ServiceError> {
    let mongo = state.require_mongo().await?;
    let season = state.config().season;
    let repository = RoundRepository::new(mongo);

    let current = repository.current_round(season).await?;
    let rounds = repository.list(season).await?;
    Ok(rounds
        .iter()
        .map(|entity| RoundSummary::from_entity(entity, current))
        .collect())
}

/// Create or replace a round definition.
pub async fn upsert_round(
    state: &SharedState,
    request: UpsertRoundRequest,
) -> Result<RoundSummary, ServiceError> {
    let mongo = state.require_mongo().await?;
    let season = state.config().season;
    let repository = RoundRepository::new(mongo);

    let games = request
        .games
        .into_iter()
        .map(|game| GameEntity {
            label: game.label,
            venue: game.venue,
            start_time_ms: game.start_time_ms,
            questions: game
                .questions
                .into_iter()
                .map(|question| QuestionEntity {
                    quarter: question.quarter,
                    text: question.text,
                })
                .collect(),
        })
        .collect();

    let entity = RoundEntity {
        id: RoundEntity::key(season, request.number),
        season,
        number: request.number,
        games,
    };

    let current = repository.current_round(season).await?;
    repository.save(entity.clone()).await?;
    Ok(RoundSummary::from_entity(&entity, current))
}

/// Publish a round as the season's current round. The round must exist.
pub async fn publish_round(state: &SharedState, number: u32) -> Result<(), ServiceError> {
    let mongo = state.require_mongo().await?;
    let season = state.config().season;
    let repository = RoundRepository::new(mongo);

    if repository.find(season, number).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "round {number} does not exist for season {season}"
        )));
    }
    repository.publish(season, number).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_with(games: usize, questions_each: usize) -> RoundEntity {
        RoundEntity {
            id: RoundEntity::key(2026, 3),
            season: 2026,
            number: 3,
            games: (0..games)
                .map(|i| GameEntity {
                    label: format!("Match {i}"),
                    venue: "MCG".into(),
                    start_time_ms: 0,
                    questions: (1..=questions_each)
                        .map(|q| QuestionEntity {
                            quarter: q as u32,
                            text: format!("Question {q}?"),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn question_sets_assign_positional_ids() {
        let round = round_with(2, 3);
        let sets = question_sets(&round);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].game_id, "R3-G1");
        assert_eq!(sets[1].game_id, "R3-G2");
        assert_eq!(
            sets[1].question_ids,
            vec!["R3-G2-Q1", "R3-G2-Q2", "R3-G2-Q3"]
        );
    }

    #[test]
    fn all_question_ids_preserve_round_order() {
        let round = round_with(2, 2);
        assert_eq!(
            all_question_ids(&round),
            vec!["R3-G1-Q1", "R3-G1-Q2", "R3-G2-Q1", "R3-G2-Q2"]
        );
    }
}
