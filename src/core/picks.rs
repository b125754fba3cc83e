//! Pick aggregation.
//!
//! Turns the flat pick records fetched from storage into per-question
//! sentiment tallies and per-user pick maps. Store reads against a list of
//! question ids must go through [`chunk_ids`]: the underlying store only
//! filters efficiently on `$in` lists of at most [`FILTER_CHUNK`] values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum number of ids per filtered store read.
pub const FILTER_CHUNK: usize = 10;

/// A player's answer to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    /// Picked Yes.
    Yes,
    /// Picked No.
    No,
}

impl Answer {
    /// Strict parse: only the exact strings `yes` and `no` count.
    /// Anything else is an unusable record and is ignored by aggregation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "yes" => Some(Answer::Yes),
            "no" => Some(Answer::No),
            _ => None,
        }
    }

    /// The stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
        }
    }
}

/// One pick record as read from storage.
#[derive(Debug, Clone)]
pub struct PickRecord {
    /// Owning user id.
    pub user: String,
    /// Question id the pick targets.
    pub question_id: String,
    /// Raw answer string.
    pub answer: String,
}

/// Yes/No sentiment tally for a single question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickTally {
    /// Number of Yes picks.
    pub yes: u32,
    /// Number of No picks.
    pub no: u32,
}

impl PickTally {
    /// Total counted picks.
    pub fn total(&self) -> u32 {
        self.yes + self.no
    }

    /// Percentage of Yes picks, rounded; 0 when there are no picks.
    pub fn yes_percent(&self) -> u32 {
        percent(self.yes, self.total())
    }

    /// Percentage of No picks, rounded; 0 when there are no picks.
    pub fn no_percent(&self) -> u32 {
        percent(self.no, self.total())
    }
}

fn percent(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((f64::from(part) / f64::from(total)) * 100.0).round() as u32
}

/// Aggregated picks for a set of question ids.
#[derive(Debug, Default)]
pub struct PickSet {
    /// Sentiment tally per question id.
    pub tallies: HashMap<String, PickTally>,
    /// Every user's pick map (question id to answer).
    pub by_user: HashMap<String, HashMap<String, Answer>>,
}

impl PickSet {
    /// The pick map of one user, empty when the user has no counted picks.
    pub fn picks_of(&self, user: &str) -> HashMap<String, Answer> {
        self.by_user.get(user).cloned().unwrap_or_default()
    }
}

/// Fold pick records into tallies and per-user maps. Records whose answer is
/// not exactly `yes` or `no` are skipped.
pub fn aggregate<I>(records: I) -> PickSet
where
    I: IntoIterator<Item = PickRecord>,
{
    let mut set = PickSet::default();

    for record in records {
        let Some(answer) = Answer::parse(&record.answer) else {
            continue;
        };

        let tally = set.tallies.entry(record.question_id.clone()).or_default();
        match answer {
            Answer::Yes => tally.yes += 1,
            Answer::No => tally.no += 1,
        }

        set.by_user
            .entry(record.user)
            .or_default()
            .insert(record.question_id, answer);
    }

    set
}

/// Split a list of question ids into store-filter-sized chunks.
pub fn chunk_ids(ids: &[String]) -> impl Iterator<Item = &[String]> {
    ids.chunks(FILTER_CHUNK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(user: &str, id: &str, answer: &str) -> PickRecord {
        PickRecord {
            user: user.to_owned(),
            question_id: id.to_owned(),
            answer: answer.to_owned(),
        }
    }

    #[test]
    fn tallies_count_only_strict_yes_no() {
        let set = aggregate(vec![
            pick("alice", "R1-G1-Q1", "yes"),
            pick("bob", "R1-G1-Q1", "no"),
            pick("carol", "R1-G1-Q1", "YES"),
            pick("dave", "R1-G1-Q1", "maybe"),
        ]);
        assert_eq!(set.tallies["R1-G1-Q1"], PickTally { yes: 1, no: 1 });
        assert!(!set.by_user.contains_key("carol"));
        assert!(!set.by_user.contains_key("dave"));
    }

    #[test]
    fn percentages_round_and_handle_empty() {
        let tally = PickTally { yes: 2, no: 1 };
        assert_eq!(tally.yes_percent(), 67);
        assert_eq!(tally.no_percent(), 33);

        let empty = PickTally::default();
        assert_eq!(empty.yes_percent(), 0);
        assert_eq!(empty.no_percent(), 0);
    }

    #[test]
    fn per_user_maps_cover_all_counted_picks() {
        let set = aggregate(vec![
            pick("alice", "R1-G1-Q1", "yes"),
            pick("alice", "R1-G1-Q2", "no"),
            pick("bob", "R1-G1-Q1", "no"),
        ]);
        let alice = set.picks_of("alice");
        assert_eq!(alice.len(), 2);
        assert_eq!(alice["R1-G1-Q1"], Answer::Yes);
        assert_eq!(alice["R1-G1-Q2"], Answer::No);
        assert!(set.picks_of("nobody").is_empty());
    }

    #[test]
    fn chunking_splits_at_the_filter_boundary() {
        let ids = |n: usize| -> Vec<String> { (0..n).map(|i| format!("R1-G1-Q{i}")).collect() };

        let ten = ids(10);
        let chunks: Vec<_> = chunk_ids(&ten).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 10);

        let eleven = ids(11);
        let chunks: Vec<_> = chunk_ids(&eleven).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[1].len(), 1);

        let three = ids(3);
        assert_eq!(chunk_ids(&three).count(), 1);
    }

    #[test]
    fn aggregation_is_chunk_independent() {
        // The same records split across chunk-sized batches must merge into
        // identical aggregates.
        let records: Vec<PickRecord> = (0..23)
            .map(|i| {
                pick(
                    if i % 2 == 0 { "alice" } else { "bob" },
                    &format!("R1-G1-Q{}", i + 1),
                    if i % 3 == 0 { "yes" } else { "no" },
                )
            })
            .collect();

        let whole = aggregate(records.clone());

        let mut merged = PickSet::default();
        for batch in records.chunks(FILTER_CHUNK) {
            let partial = aggregate(batch.to_vec());
            for (id, tally) in partial.tallies {
                let entry = merged.tallies.entry(id).or_default();
                entry.yes += tally.yes;
                entry.no += tally.no;
            }
            for (user, picks) in partial.by_user {
                merged.by_user.entry(user).or_default().extend(picks);
            }
        }

        assert_eq!(merged.tallies, whole.tallies);
        assert_eq!(merged.by_user, whole.by_user);
    }
}
