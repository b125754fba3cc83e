use mongodb::{Collection, bson::doc};

use crate::dao::{
    models::BonusMarkerEntity,
    mongodb::{BONUS_COLLECTION, MongoManager, StoreError, is_duplicate_key},
};

/// Data access for per-season bonus-action markers.
#[derive(Clone)]
pub struct BonusRepository {
    mongo: MongoManager,
}

/// Result of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// The marker was created; the allowance is now consumed.
    Claimed,
    /// A marker already existed for this season and user.
    AlreadyUsed,
}

impl BonusRepository {
    /// Wrap a Mongo handle.
    pub fn new(mongo: MongoManager) -> Self {
        Self { mongo }
    }

    async fn collection(&self) -> Collection<BonusMarkerEntity> {
        self.mongo.database().await.collection(BONUS_COLLECTION)
    }

    /// Atomically claim the one-per-season allowance. A plain insert
    /// against the unique composed `_id` turns the historical
    /// check-then-act race into a single conditional write: concurrent
    /// claims lose with a duplicate-key error.
    pub async fn try_claim(&self, marker: BonusMarkerEntity) -> Result<ClaimResult, StoreError> {
        match self.collection().await.insert_one(&marker).await {
            Ok(_) => Ok(ClaimResult::Claimed),
            Err(err) if is_duplicate_key(&err) => Ok(ClaimResult::AlreadyUsed),
            Err(source) => Err(StoreError::Write {
                collection: BONUS_COLLECTION,
                source,
            }),
        }
    }

    /// Fetch the marker for a season and user, if the allowance is spent.
    pub async fn find(
        &self,
        season: i32,
        user: &str,
    ) -> Result<Option<BonusMarkerEntity>, StoreError> {
        self.collection()
            .await
            .find_one(doc! {"_id": BonusMarkerEntity::key(season, user)})
            .await
            .map_err(|source| StoreError::Read {
                collection: BONUS_COLLECTION,
                source,
            })
    }
}
