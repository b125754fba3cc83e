//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::core::identity::is_valid_question_id;

/// Validates that a question id matches the strict pattern
/// `^(OR|R\d+)-G\d+-Q\d+(-[0-9a-z]+)?$`.
///
/// # Examples
///
/// ```ignore
/// validate_question_id("R3-G2-Q4")        // Ok
/// validate_question_id("r3-g2-q4")        // Err - lowercase round code
/// validate_question_id("R3-G2")           // Err - missing question segment
/// ```
pub fn validate_question_id(id: &str) -> Result<(), ValidationError> {
    if !is_valid_question_id(id) {
        let mut err = ValidationError::new("question_id_format");
        err.message = Some(format!("`{id}` is not a valid question id").into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a game id matches `^(OR|R\d+)-G\d+$`.
pub fn validate_game_id(id: &str) -> Result<(), ValidationError> {
    // A game id is a question id minus its question segment; validate by
    // appending a synthetic one.
    if is_valid_question_id(&format!("{id}-Q1")) && !id.contains('Q') {
        return Ok(());
    }
    let mut err = ValidationError::new("game_id_format");
    err.message = Some(format!("`{id}` is not a valid game id").into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_question_id_valid() {
        assert!(validate_question_id("OR-G1-Q1").is_ok());
        assert!(validate_question_id("R12-G4-Q2").is_ok());
        assert!(validate_question_id("R3-G2-Q4-1k9zq2").is_ok());
    }

    #[test]
    fn test_validate_question_id_invalid() {
        assert!(validate_question_id("").is_err());
        assert!(validate_question_id("r3-g2-q4").is_err()); // lowercase
        assert!(validate_question_id("R3-G2").is_err()); // missing segment
        assert!(validate_question_id("R3-G2-Q4-UPPER").is_err()); // bad hash
    }

    #[test]
    fn test_validate_game_id() {
        assert!(validate_game_id("R3-G2").is_ok());
        assert!(validate_game_id("OR-G1").is_ok());
        assert!(validate_game_id("R3-G2-Q4").is_err());
        assert!(validate_game_id("R3").is_err());
    }
}
