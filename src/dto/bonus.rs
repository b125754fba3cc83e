//! Free-kick (bonus action) request/response shapes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::{format_millis, validation::validate_game_id};

/// Payload to claim the one-per-season free kick for a match.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FreeKickRequest {
    /// Target game id (`{roundCode}-G{n}`).
    pub game_id: String,
}

impl Validate for FreeKickRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_game_id(&self.game_id) {
            errors.add("game_id", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Confirmation of a successful claim.
#[derive(Debug, Serialize, ToSchema)]
pub struct FreeKickResponse {
    /// Game the claim targeted.
    pub game_id: String,
    /// Claim timestamp, Rfc3339.
    pub claimed_at: String,
}

impl FreeKickResponse {
    /// Build a confirmation from the claim details.
    pub fn new(game_id: String, claimed_at_ms: i64) -> Self {
        Self {
            game_id,
            claimed_at: format_millis(claimed_at_ms),
        }
    }
}
