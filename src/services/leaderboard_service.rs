//! Round leaderboard assembly.

use crate::{
    core::{picks, status, streak},
    dao::{picks::PickRepository, statuses::StatusRepository},
    dto::leaderboard::{LeaderboardEntry, LeaderboardResponse},
    error::ServiceError,
    services::round_service,
    state::SharedState,
};

/// Build the leaderboard for the published round: every user with at least
/// one pick, ranked by best streak across the round's games.
pub async fn current_leaderboard(
    state: &SharedState,
) -> Result<LeaderboardResponse, ServiceError> {
    let round = round_service::current_round(state).await?;
    let sets = round_service::question_sets(&round);
    let all_ids: Vec<String> = sets
        .iter()
        .flat_map(|set| set.question_ids.iter().cloned())
        .collect();
    let games_ids: Vec<Vec<String>> = sets.into_iter().map(|set| set.question_ids).collect();

    let mongo = state.require_mongo().await?;
    let status_repo = StatusRepository::new(mongo.clone());
    let pick_repo = PickRepository::new(mongo);

    let (status_records, pick_records) = tokio::join!(
        status_repo.for_round(round.number),
        pick_repo.for_questions(&all_ids),
    );
    let statuses = status::reconcile(status_records?.into_iter().map(Into::into));
    let pick_set = picks::aggregate(pick_records?.into_iter().map(Into::into));

    let rule = state.config().missing_pick_rule;
    let scored: Vec<(String, u32)> = pick_set
        .by_user
        .iter()
        .map(|(user, user_picks)| {
            (
                user.clone(),
                streak::best_streak_across_games(&games_ids, &statuses, user_picks, rule),
            )
        })
        .collect();

    Ok(LeaderboardResponse {
        round: round.number,
        entries: rank(scored),
    })
}

/// Order scored users into ranked entries: streak descending, ties
/// alphabetical by user id, ranks 1-based.
fn rank(mut scored: Vec<(String, u32)>) -> Vec<LeaderboardEntry> {
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored
        .into_iter()
        .enumerate()
        .map(|(index, (user, streak))| LeaderboardEntry {
            rank: (index + 1) as u32,
            user,
            streak,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_streak_then_user() {
        let entries = rank(vec![
            ("mia".into(), 2),
            ("zed".into(), 4),
            ("ann".into(), 2),
            ("kai".into(), 0),
        ]);

        let order: Vec<(&str, u32, u32)> = entries
            .iter()
            .map(|entry| (entry.user.as_str(), entry.streak, entry.rank))
            .collect();
        assert_eq!(
            order,
            vec![("zed", 4, 1), ("ann", 2, 2), ("mia", 2, 3), ("kai", 0, 4)]
        );
    }

    #[test]
    fn zero_streak_users_still_appear() {
        let entries = rank(vec![("solo".into(), 0)]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].streak, 0);
    }
}
