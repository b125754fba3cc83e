//! Clean-sweep streak computation.
//!
//! A match streak is the number of correct picks across a match's settled,
//! non-void questions, except that a single wrong pick zeroes the whole
//! match. A user's round score is the best match streak across the round's
//! games, not a sum. Question ids are round-scoped, so every figure resets
//! each round by construction.

use std::collections::HashMap;

use serde::Deserialize;

use crate::core::{
    picks::Answer,
    status::{Outcome, QuestionStatus},
};

/// How a settled question the user never picked affects the streak.
///
/// Both behaviors exist upstream; `Skip` is the primary rule because it
/// feeds the leaderboard. The alternative is kept selectable rather than
/// silently discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPickRule {
    /// Unpicked questions are skipped and do not affect the streak.
    #[default]
    Skip,
    /// An unpicked settled question counts as a miss and zeroes the match.
    Break,
}

/// Compute the clean-sweep streak for one match.
///
/// `question_ids` must be in the match's defined question order. Open and
/// pending questions are skipped, as are void ones. A pick that contradicts
/// the settled outcome returns 0 immediately.
pub fn match_streak(
    question_ids: &[String],
    statuses: &HashMap<String, QuestionStatus>,
    picks: &HashMap<String, Answer>,
    rule: MissingPickRule,
) -> u32 {
    let mut correct = 0;

    for id in question_ids {
        let Some(status) = statuses.get(id) else {
            // No settlement record yet; not decided.
            continue;
        };
        if !status.is_settled() || status.is_void() {
            continue;
        }
        let Some(outcome) = status.outcome else {
            // Final without a recognized outcome; treat as undecided.
            continue;
        };

        let Some(pick) = picks.get(id) else {
            match rule {
                MissingPickRule::Skip => continue,
                MissingPickRule::Break => return 0,
            }
        };

        let correct_pick = match outcome {
            Outcome::Yes => *pick == Answer::Yes,
            Outcome::No => *pick == Answer::No,
            Outcome::Void => continue,
        };
        if correct_pick {
            correct += 1;
        } else {
            // Clean sweep: one miss zeroes the match.
            return 0;
        }
    }

    correct
}

/// Best match streak across all games of a round for one user.
pub fn best_streak_across_games(
    games: &[Vec<String>],
    statuses: &HashMap<String, QuestionStatus>,
    picks: &HashMap<String, Answer>,
    rule: MissingPickRule,
) -> u32 {
    games
        .iter()
        .map(|questions| match_streak(questions, statuses, picks, rule))
        .max()
        .unwrap_or(0)
}

/// The round leader: a user id and their best streak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    /// User holding the leading streak.
    pub user: String,
    /// The leading best-streak value.
    pub streak: u32,
}

/// Find the leading best-streak among all users with picks in the round.
///
/// Ties resolve to the alphabetically lowest user id so the result is
/// deterministic regardless of map iteration order.
pub fn leader(
    games: &[Vec<String>],
    statuses: &HashMap<String, QuestionStatus>,
    picks_by_user: &HashMap<String, HashMap<String, Answer>>,
    rule: MissingPickRule,
) -> Option<Leader> {
    let mut best: Option<Leader> = None;

    for (user, picks) in picks_by_user {
        let streak = best_streak_across_games(games, statuses, picks, rule);
        let candidate = Leader {
            user: user.clone(),
            streak,
        };
        best = match best {
            None => Some(candidate),
            Some(current) => {
                if candidate.streak > current.streak
                    || (candidate.streak == current.streak && candidate.user < current.user)
                {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        };
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::StatusKind;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{prefix}-Q{i}")).collect()
    }

    fn settled(outcome: Outcome) -> QuestionStatus {
        QuestionStatus {
            status: StatusKind::Final,
            outcome: Some(outcome),
        }
    }

    fn open() -> QuestionStatus {
        QuestionStatus {
            status: StatusKind::Open,
            outcome: None,
        }
    }

    fn voided() -> QuestionStatus {
        QuestionStatus {
            status: StatusKind::Void,
            outcome: Some(Outcome::Void),
        }
    }

    struct MatchFixture {
        questions: Vec<String>,
        statuses: HashMap<String, QuestionStatus>,
        picks: HashMap<String, Answer>,
    }

    impl MatchFixture {
        fn new(n: usize) -> Self {
            Self {
                questions: ids("R1-G1", n),
                statuses: HashMap::new(),
                picks: HashMap::new(),
            }
        }

        fn with(mut self, index: usize, status: QuestionStatus, pick: Option<Answer>) -> Self {
            let id = self.questions[index].clone();
            self.statuses.insert(id.clone(), status);
            if let Some(answer) = pick {
                self.picks.insert(id, answer);
            }
            self
        }

        fn streak(&self, rule: MissingPickRule) -> u32 {
            match_streak(&self.questions, &self.statuses, &self.picks, rule)
        }
    }

    #[test]
    fn one_miss_zeroes_the_match() {
        // [correct, correct, wrong, correct] must yield 0, not 2.
        let fixture = MatchFixture::new(4)
            .with(0, settled(Outcome::Yes), Some(Answer::Yes))
            .with(1, settled(Outcome::No), Some(Answer::No))
            .with(2, settled(Outcome::Yes), Some(Answer::No))
            .with(3, settled(Outcome::Yes), Some(Answer::Yes));
        assert_eq!(fixture.streak(MissingPickRule::Skip), 0);
    }

    #[test]
    fn void_questions_are_neutral() {
        let fixture = MatchFixture::new(3)
            .with(0, settled(Outcome::Yes), Some(Answer::Yes))
            .with(1, voided(), Some(Answer::No))
            .with(2, settled(Outcome::No), Some(Answer::No));
        assert_eq!(fixture.streak(MissingPickRule::Skip), 2);
    }

    #[test]
    fn unsettled_questions_are_neutral() {
        let fixture = MatchFixture::new(3)
            .with(0, settled(Outcome::Yes), Some(Answer::Yes))
            .with(1, open(), Some(Answer::Yes))
            .with(2, settled(Outcome::No), Some(Answer::No));
        assert_eq!(fixture.streak(MissingPickRule::Skip), 2);
    }

    #[test]
    fn missing_pick_skips_or_breaks_by_rule() {
        let fixture = MatchFixture::new(3)
            .with(0, settled(Outcome::Yes), Some(Answer::Yes))
            .with(1, settled(Outcome::No), None)
            .with(2, settled(Outcome::Yes), Some(Answer::Yes));
        assert_eq!(fixture.streak(MissingPickRule::Skip), 2);
        assert_eq!(fixture.streak(MissingPickRule::Break), 0);
    }

    #[test]
    fn final_without_outcome_is_neutral() {
        let fixture = MatchFixture::new(2)
            .with(
                0,
                QuestionStatus {
                    status: StatusKind::Final,
                    outcome: None,
                },
                Some(Answer::Yes),
            )
            .with(1, settled(Outcome::Yes), Some(Answer::Yes));
        assert_eq!(fixture.streak(MissingPickRule::Skip), 1);
    }

    #[test]
    fn best_across_games_is_a_max_not_a_sum() {
        let game_one = ids("R1-G1", 2);
        let game_two = ids("R1-G2", 3);

        let mut statuses = HashMap::new();
        let mut picks = HashMap::new();
        for id in game_one.iter().chain(game_two.iter()) {
            statuses.insert(id.clone(), settled(Outcome::Yes));
            picks.insert(id.clone(), Answer::Yes);
        }
        // A miss in game one zeroes it; game two survives with 3.
        picks.insert(game_one[1].clone(), Answer::No);

        let games = vec![game_one, game_two];
        assert_eq!(
            best_streak_across_games(&games, &statuses, &picks, MissingPickRule::Skip),
            3
        );
    }

    #[test]
    fn rounds_are_isolated_by_id_scope() {
        // Picks keyed under round 1 ids cannot contribute to a round 2
        // computation because nothing in round 2's id set matches them.
        let round_two_games = vec![ids("R2-G1", 2)];
        let mut statuses = HashMap::new();
        for id in &round_two_games[0] {
            statuses.insert(id.clone(), settled(Outcome::Yes));
        }

        let mut stale_picks = HashMap::new();
        for id in ids("R1-G1", 2) {
            stale_picks.insert(id, Answer::Yes);
        }

        assert_eq!(
            best_streak_across_games(
                &round_two_games,
                &statuses,
                &stale_picks,
                MissingPickRule::Skip
            ),
            0
        );
    }

    #[test]
    fn leader_picks_the_maximum() {
        let games = vec![ids("R1-G1", 3)];
        let mut statuses = HashMap::new();
        for id in &games[0] {
            statuses.insert(id.clone(), settled(Outcome::Yes));
        }

        let mut by_user = HashMap::new();
        let mut strong = HashMap::new();
        for id in &games[0] {
            strong.insert(id.clone(), Answer::Yes);
        }
        let mut weak = strong.clone();
        weak.insert(games[0][2].clone(), Answer::No);

        by_user.insert("zoe".to_owned(), strong);
        by_user.insert("ann".to_owned(), weak);

        let leader = leader(&games, &statuses, &by_user, MissingPickRule::Skip).unwrap();
        assert_eq!(leader.user, "zoe");
        assert_eq!(leader.streak, 3);
    }

    #[test]
    fn leader_tie_breaks_alphabetically() {
        let games = vec![ids("R1-G1", 2)];
        let mut statuses = HashMap::new();
        for id in &games[0] {
            statuses.insert(id.clone(), settled(Outcome::Yes));
        }

        let full: HashMap<String, Answer> = games[0]
            .iter()
            .map(|id| (id.clone(), Answer::Yes))
            .collect();

        let mut by_user = HashMap::new();
        by_user.insert("zoe".to_owned(), full.clone());
        by_user.insert("ann".to_owned(), full);

        let leader = leader(&games, &statuses, &by_user, MissingPickRule::Skip).unwrap();
        assert_eq!(leader.user, "ann");
        assert_eq!(leader.streak, 2);
    }

    #[test]
    fn leader_is_none_without_pickers() {
        let games = vec![ids("R1-G1", 2)];
        assert_eq!(
            leader(
                &games,
                &HashMap::new(),
                &HashMap::new(),
                MissingPickRule::Skip
            ),
            None
        );
    }
}
