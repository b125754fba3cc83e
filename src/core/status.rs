//! Settlement status vocabulary and reconciliation.
//!
//! Status records are written by admin settlement actions and by the
//! lock-started sync. Historical writers produced duplicates and loose
//! spellings, so reads go through [`reconcile`], which collapses raw records
//! into one authoritative `{status, outcome}` per question id using
//! latest-write-wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::identity::is_valid_question_id;

/// Lifecycle state of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Accepting picks.
    Open,
    /// Locked for picks, not yet decided.
    Pending,
    /// Settled with an outcome.
    Final,
    /// Settled as void; neither helps nor hurts a streak.
    Void,
}

impl StatusKind {
    /// Canonical stored spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Open => "open",
            StatusKind::Pending => "pending",
            StatusKind::Final => "final",
            StatusKind::Void => "void",
        }
    }
}

/// Settled outcome of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The Yes side won.
    Yes,
    /// The No side won.
    No,
    /// Voided; excluded from streaks.
    Void,
}

impl Outcome {
    /// Canonical stored spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Yes => "yes",
            Outcome::No => "no",
            Outcome::Void => "void",
        }
    }
}

/// Authoritative settlement state of one question after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionStatus {
    /// Lifecycle state.
    pub status: StatusKind,
    /// Outcome, meaningful only when `status` is `Final` or `Void`.
    pub outcome: Option<Outcome>,
}

impl QuestionStatus {
    /// Whether this question participates in streak computation.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, StatusKind::Final | StatusKind::Void)
    }

    /// Whether this question counts as void for streak purposes, either by
    /// status or by outcome.
    pub fn is_void(&self) -> bool {
        self.status == StatusKind::Void || self.outcome == Some(Outcome::Void)
    }
}

/// Raw status record as stored, before reconciliation. Fields are optional
/// because historical writers omitted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatusRecord {
    /// Question id the record claims to describe.
    pub question_id: Option<String>,
    /// Loose status string (any casing/spelling).
    pub status: Option<String>,
    /// Loose outcome string (any casing/synonym).
    pub outcome: Option<String>,
    /// Write timestamp in epoch milliseconds; missing sorts lowest.
    pub updated_at_ms: Option<i64>,
}

/// Case-fold and substring-match a loose status string onto the status
/// vocabulary. Unrecognized strings fall back to `Open`.
pub fn normalize_status(raw: &str) -> StatusKind {
    let folded = raw.trim().to_lowercase();
    if folded.contains("final") {
        StatusKind::Final
    } else if folded.contains("void") {
        StatusKind::Void
    } else if folded.contains("pending") {
        StatusKind::Pending
    } else {
        StatusKind::Open
    }
}

/// Case-insensitively map a loose outcome string onto the outcome
/// vocabulary, recognizing the synonyms found in historical data.
/// Unrecognized strings mean "no outcome yet", not an error.
pub fn normalize_outcome(raw: &str) -> Option<Outcome> {
    let folded = raw.trim().to_lowercase();
    match folded.as_str() {
        "yes" | "y" | "correct" | "win" | "winner" => Some(Outcome::Yes),
        "no" | "n" | "wrong" | "incorrect" | "loss" | "lose" | "loser" => Some(Outcome::No),
        "void" | "cancel" | "cancelled" | "canceled" | "abandoned" => Some(Outcome::Void),
        _ => None,
    }
}

/// Collapse raw status records into one authoritative entry per question id.
///
/// Records missing their id or status, or carrying a malformed id, are
/// discarded. Within a group the record with the greatest timestamp wins
/// (missing timestamp counts as 0); equal timestamps are broken by
/// comparing the raw status then outcome strings, so the result is
/// independent of input order.
pub fn reconcile<I>(records: I) -> HashMap<String, QuestionStatus>
where
    I: IntoIterator<Item = RawStatusRecord>,
{
    let mut winners: HashMap<String, RawStatusRecord> = HashMap::new();

    for record in records {
        let Some(id) = record.question_id.clone() else {
            continue;
        };
        if record.status.is_none() || !is_valid_question_id(&id) {
            continue;
        }

        match winners.get(&id) {
            Some(current) if !beats(&record, current) => {}
            _ => {
                winners.insert(id, record);
            }
        }
    }

    winners
        .into_iter()
        .map(|(id, record)| {
            let status = normalize_status(record.status.as_deref().unwrap_or_default());
            let outcome = record.outcome.as_deref().and_then(normalize_outcome);
            (id, QuestionStatus { status, outcome })
        })
        .collect()
}

fn beats(candidate: &RawStatusRecord, current: &RawStatusRecord) -> bool {
    let key = |r: &RawStatusRecord| {
        (
            r.updated_at_ms.unwrap_or(0),
            r.status.clone().unwrap_or_default(),
            r.outcome.clone().unwrap_or_default(),
        )
    };
    key(candidate) > key(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, status: &str, outcome: Option<&str>, ts: Option<i64>) -> RawStatusRecord {
        RawStatusRecord {
            question_id: Some(id.to_owned()),
            status: Some(status.to_owned()),
            outcome: outcome.map(str::to_owned),
            updated_at_ms: ts,
        }
    }

    #[test]
    fn status_normalization_tolerates_casing_and_noise() {
        assert_eq!(normalize_status("FINAL"), StatusKind::Final);
        assert_eq!(normalize_status("  Finalised "), StatusKind::Final);
        assert_eq!(normalize_status("VOIDED"), StatusKind::Void);
        assert_eq!(normalize_status("Pending review"), StatusKind::Pending);
        assert_eq!(normalize_status("open"), StatusKind::Open);
        assert_eq!(normalize_status("???"), StatusKind::Open);
    }

    #[test]
    fn outcome_synonyms_normalize() {
        for raw in ["Winner", "WIN", "yes", "correct"] {
            assert_eq!(normalize_outcome(raw), Some(Outcome::Yes), "{raw}");
        }
        for raw in ["Loser", "wrong", "no", "LOSS"] {
            assert_eq!(normalize_outcome(raw), Some(Outcome::No), "{raw}");
        }
        for raw in ["Cancelled", "void", "canceled"] {
            assert_eq!(normalize_outcome(raw), Some(Outcome::Void), "{raw}");
        }
        assert_eq!(normalize_outcome("TBD"), None);
        assert_eq!(normalize_outcome(""), None);
    }

    #[test]
    fn latest_write_wins() {
        let records = vec![
            record("R1-G1-Q1", "open", None, Some(10)),
            record("R1-G1-Q1", "final", Some("yes"), Some(30)),
            record("R1-G1-Q1", "pending", None, Some(20)),
        ];
        let map = reconcile(records);
        assert_eq!(
            map["R1-G1-Q1"],
            QuestionStatus {
                status: StatusKind::Final,
                outcome: Some(Outcome::Yes),
            }
        );
    }

    #[test]
    fn missing_timestamp_sorts_lowest() {
        let records = vec![
            record("R1-G1-Q1", "final", Some("no"), None),
            record("R1-G1-Q1", "pending", None, Some(1)),
        ];
        let map = reconcile(records);
        assert_eq!(map["R1-G1-Q1"].status, StatusKind::Pending);
    }

    #[test]
    fn reconciliation_is_permutation_invariant() {
        let base = vec![
            record("R1-G1-Q1", "open", None, Some(5)),
            record("R1-G1-Q1", "final", Some("yes"), Some(5)),
            record("R1-G1-Q2", "void", Some("cancelled"), Some(2)),
            record("R1-G1-Q2", "final", Some("no"), Some(2)),
            record("R1-G1-Q3", "pending", None, None),
        ];

        let reference = reconcile(base.clone());
        // Walk every rotation; equal timestamps must still resolve to the
        // same winner.
        for rotation in 0..base.len() {
            let mut permuted = base.clone();
            permuted.rotate_left(rotation);
            assert_eq!(reconcile(permuted), reference, "rotation {rotation}");
        }
    }

    #[test]
    fn records_without_id_or_status_are_dropped() {
        let records = vec![
            RawStatusRecord {
                question_id: None,
                status: Some("final".into()),
                outcome: None,
                updated_at_ms: Some(1),
            },
            RawStatusRecord {
                question_id: Some("R1-G1-Q1".into()),
                status: None,
                outcome: Some("yes".into()),
                updated_at_ms: Some(1),
            },
        ];
        assert!(reconcile(records).is_empty());
    }

    #[test]
    fn malformed_ids_are_excluded() {
        let records = vec![
            record("r1-g1-q1", "final", Some("yes"), Some(1)),
            record("R1-G1-Q1-BAD", "final", Some("yes"), Some(1)),
            record("R1-G1-Q1", "final", Some("yes"), Some(1)),
        ];
        let map = reconcile(records);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("R1-G1-Q1"));
    }

    #[test]
    fn unrecognized_outcome_is_kept_as_none() {
        let records = vec![record("R1-G1-Q1", "final", Some("TBD"), Some(1))];
        let map = reconcile(records);
        assert_eq!(map["R1-G1-Q1"].outcome, None);
        assert_eq!(map["R1-G1-Q1"].status, StatusKind::Final);
    }
}
