//! Free-kick claim orchestration.
//!
//! The gate's pure preconditions live in [`crate::core::gate`]; this module
//! supplies them with data and closes the claim race with an atomic marker
//! insert. The early already-used read keeps rejection ordering stable for
//! callers, but the insert is what actually guarantees one claim per
//! season.

use tracing::info;

use crate::{
    core::{gate, gate::GateRejection, picks, status},
    dao::{
        bonus::{BonusRepository, ClaimResult},
        models::BonusMarkerEntity,
        picks::PickRepository,
        statuses::StatusRepository,
    },
    dto::bonus::{FreeKickRequest, FreeKickResponse},
    error::ServiceError,
    services::{now_ms, round_service},
    state::SharedState,
};

/// Claim the one-per-season free kick against a match of the published
/// round. `caller` is the resolved identity, `None` when the request
/// carried no usable token; the missing identity is a gate rejection so
/// its reason code reaches the wire like every other one.
pub async fn claim_free_kick(
    state: &SharedState,
    caller: Option<&str>,
    request: FreeKickRequest,
) -> Result<FreeKickResponse, ServiceError> {
    let user = require_player(caller)?;
    let mongo = state.require_mongo().await?;
    let season = state.config().season;
    let bonus_repo = BonusRepository::new(mongo.clone());

    if bonus_repo.find(season, user).await?.is_some() {
        return Err(ServiceError::Rejected(GateRejection::AlreadyUsed));
    }

    let round = round_service::current_round(state).await?;
    let sets = round_service::question_sets(&round);
    let Some(target) = sets.into_iter().find(|set| set.game_id == request.game_id) else {
        return Err(ServiceError::Rejected(GateRejection::MatchNotFound));
    };

    let status_repo = StatusRepository::new(mongo.clone());
    let pick_repo = PickRepository::new(mongo);
    let (status_records, pick_records) = tokio::join!(
        status_repo.for_questions(round.number, &target.question_ids),
        pick_repo.for_questions(&target.question_ids),
    );
    let statuses = status::reconcile(status_records?.into_iter().map(Into::into));
    let pick_set = picks::aggregate(pick_records?.into_iter().map(Into::into));
    let user_picks = pick_set.picks_of(user);

    gate::evaluate(&target.question_ids, &statuses, &user_picks)
        .map_err(ServiceError::Rejected)?;

    let claimed_at_ms = now_ms();
    let marker = BonusMarkerEntity {
        id: BonusMarkerEntity::key(season, user),
        season,
        user: user.to_owned(),
        game_id: target.game_id.clone(),
        claimed_at_ms,
    };
    // The insert races other requests for the same allowance; the unique
    // `_id` decides the winner.
    let result = bonus_repo.try_claim(marker).await?;
    let response = claim_outcome(result, target.game_id, claimed_at_ms)?;
    info!(user, game_id = %response.game_id, "free kick claimed");
    Ok(response)
}

/// Resolve the caller identity or reject with the `unauthenticated`
/// reason code.
fn require_player(caller: Option<&str>) -> Result<&str, ServiceError> {
    caller.ok_or(ServiceError::Rejected(GateRejection::Unauthenticated))
}

/// Map the marker-insert result onto the claim response: the losing side
/// of the insert race gets the same rejection as a straight re-claim.
fn claim_outcome(
    result: ClaimResult,
    game_id: String,
    claimed_at_ms: i64,
) -> Result<FreeKickResponse, ServiceError> {
    match result {
        ClaimResult::Claimed => Ok(FreeKickResponse::new(game_id, claimed_at_ms)),
        ClaimResult::AlreadyUsed => Err(ServiceError::Rejected(GateRejection::AlreadyUsed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_identity_rejects_with_unauthenticated() {
        assert!(matches!(
            require_player(None),
            Err(ServiceError::Rejected(GateRejection::Unauthenticated))
        ));
        assert_eq!(require_player(Some("mia")).unwrap(), "mia");
    }

    #[test]
    fn first_claim_succeeds_second_maps_to_already_used() {
        let first = claim_outcome(ClaimResult::Claimed, "R3-G1".into(), 1_000).unwrap();
        assert_eq!(first.game_id, "R3-G1");

        assert!(matches!(
            claim_outcome(ClaimResult::AlreadyUsed, "R3-G1".into(), 2_000),
            Err(ServiceError::Rejected(GateRejection::AlreadyUsed))
        ));
    }
}
