use futures::TryStreamExt;
use mongodb::{Collection, bson::doc};

use crate::dao::{
    models::{RoundEntity, SeasonConfigEntity},
    mongodb::{MongoManager, ROUNDS_COLLECTION, SEASON_CONFIG_COLLECTION, StoreError},
};

/// Data access for round definitions and the per-season current-round
/// pointer.
#[derive(Clone)]
pub struct RoundRepository {
    mongo: MongoManager,
}

impl RoundRepository {
    /// Wrap a Mongo handle.
    pub fn new(mongo: MongoManager) -> Self {
        Self { mongo }
    }

    async fn collection(&self) -> Collection<RoundEntity> {
        self.mongo.database().await.collection(ROUNDS_COLLECTION)
    }

    async fn config_collection(&self) -> Collection<SeasonConfigEntity> {
        self.mongo
            .database()
            .await
            .collection(SEASON_CONFIG_COLLECTION)
    }

    /// Fetch one round definition.
    pub async fn find(&self, season: i32, number: u32) -> Result<Option<RoundEntity>, StoreError> {
        self.collection()
            .await
            .find_one(doc! {"_id": RoundEntity::key(season, number)})
            .await
            .map_err(|source| StoreError::Read {
                collection: ROUNDS_COLLECTION,
                source,
            })
    }

    /// List all rounds of a season, ordered by round number.
    pub async fn list(&self, season: i32) -> Result<Vec<RoundEntity>, StoreError> {
        let read_err = |source| StoreError::Read {
            collection: ROUNDS_COLLECTION,
            source,
        };
        self.collection()
            .await
            .find(doc! {"season": season})
            .sort(doc! {"number": 1})
            .await
            .map_err(read_err)?
            .try_collect()
            .await
            .map_err(read_err)
    }

    /// Upsert a round definition, replacing the previous games list.
    pub async fn save(&self, round: RoundEntity) -> Result<(), StoreError> {
        self.collection()
            .await
            .replace_one(doc! {"_id": round.id.clone()}, &round)
            .upsert(true)
            .await
            .map_err(|source| StoreError::Write {
                collection: ROUNDS_COLLECTION,
                source,
            })?;
        Ok(())
    }

    /// The published round number for a season, if any.
    pub async fn current_round(&self, season: i32) -> Result<Option<u32>, StoreError> {
        let config = self
            .config_collection()
            .await
            .find_one(doc! {"_id": season.to_string()})
            .await
            .map_err(|source| StoreError::Read {
                collection: SEASON_CONFIG_COLLECTION,
                source,
            })?;
        Ok(config.and_then(|entity| entity.current_round))
    }

    /// Point the season at a new current round. `$set` keeps any other
    /// season-config fields intact.
    pub async fn publish(&self, season: i32, number: u32) -> Result<(), StoreError> {
        self.config_collection()
            .await
            .update_one(
                doc! {"_id": season.to_string()},
                doc! {"$set": {"season": season, "current_round": number}},
            )
            .upsert(true)
            .await
            .map_err(|source| StoreError::Write {
                collection: SEASON_CONFIG_COLLECTION,
                source,
            })?;
        Ok(())
    }
}
