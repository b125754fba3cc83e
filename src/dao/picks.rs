use futures::TryStreamExt;
use mongodb::{Collection, bson::doc};

use crate::{
    core::picks::{Answer, PickRecord, chunk_ids},
    dao::{
        models::PickEntity,
        mongodb::{MongoManager, PICKS_COLLECTION, StoreError},
    },
};

/// Data access for picks.
#[derive(Clone)]
pub struct PickRepository {
    mongo: MongoManager,
}

impl PickRepository {
    /// Wrap a Mongo handle.
    pub fn new(mongo: MongoManager) -> Self {
        Self { mongo }
    }

    async fn collection(&self) -> Collection<PickEntity> {
        self.mongo.database().await.collection(PICKS_COLLECTION)
    }

    /// All picks targeting the given question ids, read in chunks of at
    /// most ten ids per filter and merged. Mandatory path for rounds with
    /// more than ten questions.
    pub async fn for_questions(
        &self,
        question_ids: &[String],
    ) -> Result<Vec<PickEntity>, StoreError> {
        let read_err = |source| StoreError::Read {
            collection: PICKS_COLLECTION,
            source,
        };
        let collection = self.collection().await;
        let mut picks = Vec::new();

        for chunk in chunk_ids(question_ids) {
            let batch: Vec<PickEntity> = collection
                .find(doc! {"question_id": {"$in": chunk}})
                .await
                .map_err(read_err)?
                .try_collect()
                .await
                .map_err(read_err)?;
            picks.extend(batch);
        }

        Ok(picks)
    }

    /// Upsert the caller's pick for one question. The composed `_id` gives
    /// latest-write-wins per (user, question); `$set` merge leaves
    /// `created_at_ms` untouched on overwrite.
    pub async fn upsert(
        &self,
        user: &str,
        round: u32,
        question_id: &str,
        answer: Answer,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let key = PickEntity::key(user, question_id);
        self.collection()
            .await
            .update_one(
                doc! {"_id": &key},
                doc! {
                    "$set": {
                        "user": user,
                        "question_id": question_id,
                        "round": round,
                        "answer": answer.as_str(),
                        "updated_at_ms": now_ms,
                    },
                    "$setOnInsert": {"created_at_ms": now_ms},
                },
            )
            .upsert(true)
            .await
            .map_err(|source| StoreError::Write {
                collection: PICKS_COLLECTION,
                source,
            })?;
        Ok(())
    }

    /// Clear the caller's active pick. Returns whether a pick existed.
    pub async fn delete(&self, user: &str, question_id: &str) -> Result<bool, StoreError> {
        let result = self
            .collection()
            .await
            .delete_one(doc! {"_id": PickEntity::key(user, question_id)})
            .await
            .map_err(|source| StoreError::Write {
                collection: PICKS_COLLECTION,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }
}

/// Convert a stored pick into the aggregator's input shape.
impl From<PickEntity> for PickRecord {
    fn from(entity: PickEntity) -> Self {
        PickRecord {
            user: entity.user,
            question_id: entity.question_id,
            answer: entity.answer,
        }
    }
}
