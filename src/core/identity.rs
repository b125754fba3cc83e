//! Stable question identifiers.
//!
//! Every question is addressed by a round-scoped string id. The canonical
//! scheme is positional: `{roundCode}-G{game}-Q{question}` with 1-based
//! positions. A legacy content-derived scheme appends a base-36 FNV-1a hash
//! of the question source (`{roundCode}-G{game}-Q{quarter}-{hash}`); it is
//! still recognized so historical records can be repaired back onto the
//! canonical scheme.

/// FNV-1a 32-bit offset basis.
const FNV_OFFSET: u32 = 0x811c_9dc5;
/// FNV-1a 32-bit prime.
const FNV_PRIME: u32 = 16_777_619;

/// Round code: the opening round (number 0) is coded `OR`, every other
/// round `R{n}`.
pub fn round_code(round: u32) -> String {
    if round == 0 {
        "OR".to_owned()
    } else {
        format!("R{round}")
    }
}

/// Game identifier from a round number and the game's 1-based position
/// within the round.
pub fn game_id(round: u32, game_position: u32) -> String {
    format!("{}-G{}", round_code(round), game_position)
}

/// Canonical positional question identifier.
pub fn positional_question_id(round: u32, game_position: u32, question_position: u32) -> String {
    format!("{}-Q{}", game_id(round, game_position), question_position)
}

/// Legacy content-derived question identifier.
///
/// The hash covers the round number, game id, quarter and prompt text so the
/// id survives reordering of questions within a game but changes when the
/// prompt is edited.
pub fn content_question_id(round: u32, game_id: &str, quarter: u32, text: &str) -> String {
    let material = format!("{round}|{game_id}|{quarter}|{}", text.trim().to_lowercase());
    let hash = fnv1a32(material.as_bytes());
    format!("{game_id}-Q{quarter}-{}", to_base36(hash))
}

fn fnv1a32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET, |acc, byte| {
        (acc ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Round number encoded by a round code (`OR` is 0).
pub fn round_from_code(code: &str) -> Option<u32> {
    if code == "OR" {
        return Some(0);
    }
    let digits = code.strip_prefix('R')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Check a question id against the strict pattern
/// `^(OR|R\d+)-G\d+-Q\d+(-[0-9a-z]+)?$`.
///
/// Ids failing this check are excluded from reconciliation and only eligible
/// for the repair pass.
pub fn is_valid_question_id(id: &str) -> bool {
    parse_question_id(id).is_some()
}

/// Structured pieces of a valid question id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionIdParts {
    /// Round code (`OR` or `R{n}`).
    pub round_code: String,
    /// 1-based game position.
    pub game: u32,
    /// 1-based question position, or quarter number for hash-suffixed ids.
    pub question: u32,
    /// Base-36 content hash, present only on legacy ids.
    pub hash: Option<String>,
}

impl QuestionIdParts {
    /// Reassemble the canonical string form of this id.
    pub fn canonical(&self) -> String {
        format!("{}-G{}-Q{}", self.round_code, self.game, self.question)
    }
}

/// Strict parse of a question id. Returns `None` on any deviation from the
/// pattern, including lowercase round codes and uppercase hash characters.
pub fn parse_question_id(id: &str) -> Option<QuestionIdParts> {
    let mut segments = id.split('-');

    let code = segments.next()?;
    if code != "OR" {
        let digits = code.strip_prefix('R')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let game = parse_numeric_segment(segments.next()?, 'G')?;
    let question = parse_numeric_segment(segments.next()?, 'Q')?;

    let hash = match segments.next() {
        Some(suffix) => {
            if suffix.is_empty()
                || !suffix
                    .bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
            {
                return None;
            }
            Some(suffix.to_owned())
        }
        None => None,
    };

    // At most one trailing hash segment.
    if segments.next().is_some() {
        return None;
    }

    Some(QuestionIdParts {
        round_code: code.to_owned(),
        game,
        question,
        hash,
    })
}

fn parse_numeric_segment(segment: &str, prefix: char) -> Option<u32> {
    let rest = segment.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Tolerant re-parse used by the key-repair job: case-folds, strips
/// whitespace, and re-emits the id in canonical positional form (dropping
/// any hash suffix). Returns `None` when the id is structurally
/// unrecoverable.
pub fn normalize_question_id(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let upper = cleaned.to_uppercase();

    let mut segments = upper.split('-');
    let code = segments.next()?;
    let round = if code == "OR" {
        0
    } else {
        code.strip_prefix('R')?.parse::<u32>().ok()?
    };

    let game = segments.next()?.strip_prefix('G')?.parse::<u32>().ok()?;
    let question = segments.next()?.strip_prefix('Q')?.parse::<u32>().ok()?;

    Some(positional_question_id(round, game, question))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_code_opening_round() {
        assert_eq!(round_code(0), "OR");
        assert_eq!(round_code(1), "R1");
        assert_eq!(round_code(23), "R23");
    }

    #[test]
    fn positional_ids_are_deterministic() {
        let first = positional_question_id(3, 2, 4);
        let second = positional_question_id(3, 2, 4);
        assert_eq!(first, "R3-G2-Q4");
        assert_eq!(first, second);
    }

    #[test]
    fn content_ids_are_deterministic_and_text_sensitive() {
        let a = content_question_id(3, "R3-G2", 4, "Will the home side lead at the quarter?");
        let b = content_question_id(3, "R3-G2", 4, "Will the home side lead at the quarter?");
        let c = content_question_id(3, "R3-G2", 4, "Will the away side lead at the quarter?");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("R3-G2-Q4-"));
    }

    #[test]
    fn content_hash_normalizes_case_and_whitespace() {
        let a = content_question_id(1, "R1-G1", 2, "  First Goal Scored?  ");
        let b = content_question_id(1, "R1-G1", 2, "first goal scored?");
        assert_eq!(a, b);
    }

    #[test]
    fn valid_ids_pass_the_strict_pattern() {
        assert!(is_valid_question_id("OR-G1-Q1"));
        assert!(is_valid_question_id("R14-G9-Q3"));
        assert!(is_valid_question_id("R3-G2-Q4-1k9zq2"));
    }

    #[test]
    fn malformed_ids_fail_the_strict_pattern() {
        assert!(!is_valid_question_id(""));
        assert!(!is_valid_question_id("r3-g2-q4"));
        assert!(!is_valid_question_id("R3-G2"));
        assert!(!is_valid_question_id("R3-G2-Q"));
        assert!(!is_valid_question_id("R3-G2-Q4-"));
        assert!(!is_valid_question_id("R3-G2-Q4-ABC"));
        assert!(!is_valid_question_id("R3-G2-Q4-abc-def"));
        assert!(!is_valid_question_id("X3-G2-Q4"));
        assert!(!is_valid_question_id("R3 -G2-Q4"));
    }

    #[test]
    fn normalization_recovers_lowercase_and_padded_ids() {
        assert_eq!(normalize_question_id("r3-g2-q4"), Some("R3-G2-Q4".into()));
        assert_eq!(normalize_question_id(" or-g1-q2 "), Some("OR-G1-Q2".into()));
        assert_eq!(
            normalize_question_id("R3-G2-Q4-1k9zq2"),
            Some("R3-G2-Q4".into())
        );
        assert_eq!(normalize_question_id("garbage"), None);
        assert_eq!(normalize_question_id("R3-G2"), None);
    }

    #[test]
    fn round_from_code_inverts_round_code() {
        assert_eq!(round_from_code("OR"), Some(0));
        assert_eq!(round_from_code("R7"), Some(7));
        assert_eq!(round_from_code("r7"), None);
        assert_eq!(round_from_code("R"), None);
    }

    #[test]
    fn parse_exposes_components() {
        let parts = parse_question_id("R3-G2-Q4-1k9zq2").unwrap();
        assert_eq!(parts.round_code, "R3");
        assert_eq!(parts.game, 2);
        assert_eq!(parts.question, 4);
        assert_eq!(parts.hash.as_deref(), Some("1k9zq2"));
        assert_eq!(parts.canonical(), "R3-G2-Q4");
    }
}
