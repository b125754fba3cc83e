/// Per-season bonus-action marker repository.
pub mod bonus;
/// Database model definitions.
pub mod models;
/// MongoDB connection management and indexes.
pub mod mongodb;
/// Pick storage and chunked retrieval.
pub mod picks;
/// Round and season-configuration repository.
pub mod rounds;
/// Question-status records and the key-repair batch.
pub mod statuses;
