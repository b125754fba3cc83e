//! Pure domain logic: question identity, settlement reconciliation, pick
//! aggregation, streak computation and the bonus-action gate. Nothing in
//! this tree performs I/O.

/// Bonus-action ("free kick") precondition evaluation.
pub mod gate;
/// Question identifier derivation, validation and repair normalization.
pub mod identity;
/// Pick tallies, per-user pick maps and chunked-filter helpers.
pub mod picks;
/// Settlement status vocabulary and latest-write-wins reconciliation.
pub mod status;
/// Clean-sweep streak computation and leader selection.
pub mod streak;
