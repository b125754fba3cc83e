use futures::TryStreamExt;
use mongodb::{Collection, bson::doc};

use crate::{
    core::{picks::chunk_ids, status::RawStatusRecord},
    dao::{
        models::StatusRecordEntity,
        mongodb::{MongoManager, STATUS_COLLECTION, StoreError},
    },
};

/// Data access for raw question-status records.
#[derive(Clone)]
pub struct StatusRepository {
    mongo: MongoManager,
}

impl StatusRepository {
    /// Wrap a Mongo handle.
    pub fn new(mongo: MongoManager) -> Self {
        Self { mongo }
    }

    async fn collection(&self) -> Collection<StatusRecordEntity> {
        self.mongo.database().await.collection(STATUS_COLLECTION)
    }

    /// All raw records for a round, duplicates included. Reconciliation is
    /// the caller's job.
    pub async fn for_round(&self, round: u32) -> Result<Vec<StatusRecordEntity>, StoreError> {
        let read_err = |source| StoreError::Read {
            collection: STATUS_COLLECTION,
            source,
        };
        self.collection()
            .await
            .find(doc! {"round": round})
            .await
            .map_err(read_err)?
            .try_collect()
            .await
            .map_err(read_err)
    }

    /// Raw records for a bounded set of question ids, read in chunks of at
    /// most ten ids per filter.
    pub async fn for_questions(
        &self,
        round: u32,
        question_ids: &[String],
    ) -> Result<Vec<StatusRecordEntity>, StoreError> {
        let read_err = |source| StoreError::Read {
            collection: STATUS_COLLECTION,
            source,
        };
        let collection = self.collection().await;
        let mut records = Vec::new();

        for chunk in chunk_ids(question_ids) {
            let batch: Vec<StatusRecordEntity> = collection
                .find(doc! {"round": round, "question_id": {"$in": chunk}})
                .await
                .map_err(read_err)?
                .try_collect()
                .await
                .map_err(read_err)?;
            records.extend(batch);
        }

        Ok(records)
    }

    /// Upsert the canonical status record for one question. `$set` merge
    /// keeps fields other writers may have added.
    pub async fn upsert_status(
        &self,
        round: u32,
        question_id: &str,
        status: &str,
        outcome: Option<&str>,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let mut fields = doc! {
            "round": round,
            "question_id": question_id,
            "status": status,
            "updated_at_ms": now_ms,
        };
        if let Some(outcome) = outcome {
            fields.insert("outcome", outcome);
        }

        self.collection()
            .await
            .update_one(
                doc! {"round": round, "question_id": question_id},
                doc! {"$set": fields},
            )
            .upsert(true)
            .await
            .map_err(|source| StoreError::Write {
                collection: STATUS_COLLECTION,
                source,
            })?;
        Ok(())
    }

    /// Rewrite every record carrying `old_id` onto the canonical `new_id`.
    /// Returns the number of rewritten records. Idempotent: a second run
    /// matches nothing.
    pub async fn rekey(
        &self,
        round: u32,
        old_id: &str,
        new_id: &str,
    ) -> Result<u64, StoreError> {
        let result = self
            .collection()
            .await
            .update_many(
                doc! {"round": round, "question_id": old_id},
                doc! {"$set": {"question_id": new_id}},
            )
            .await
            .map_err(|source| StoreError::Write {
                collection: STATUS_COLLECTION,
                source,
            })?;
        Ok(result.modified_count)
    }
}

/// Convert a stored record into the reconciler's input shape.
impl From<StatusRecordEntity> for RawStatusRecord {
    fn from(entity: StatusRecordEntity) -> Self {
        RawStatusRecord {
            question_id: entity.question_id,
            status: entity.status,
            outcome: entity.outcome,
            updated_at_ms: entity.updated_at_ms,
        }
    }
}
