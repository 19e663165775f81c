use crate::modules::translation::model::TranslationRecord;
use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use mongodb::{Collection, Database};

const COLLECTION_NAME: &str = "translations";

pub struct TranslationCrud {
    collection: Collection<TranslationRecord>,
}

impl TranslationCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_NAME),
        }
    }

    pub async fn create(&self, record: TranslationRecord) -> Result<Option<ObjectId>, mongodb::error::Error> {
        let result = self.collection.insert_one(record).await?;
        Ok(result.inserted_id.as_object_id())
    }

    pub async fn count_since(&self, user_id: &ObjectId, since: DateTime<Utc>) -> Result<u64, mongodb::error::Error> {
        self.collection
            .count_documents(doc! {
                "user_id": user_id,
                "created_at": { "$gte": bson::DateTime::from_chrono(since) },
            })
            .await
    }

    pub async fn find_for_user(
        &self,
        user_id: &ObjectId,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<TranslationRecord>, mongodb::error::Error> {
        use futures::TryStreamExt;

        let cursor = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "created_at": -1 })
            .skip(offset)
            .limit(limit)
            .await?;

        cursor.try_collect().await
    }

    pub async fn count_for_user(&self, user_id: &ObjectId) -> Result<u64, mongodb::error::Error> {
        self.collection.count_documents(doc! { "user_id": user_id }).await
    }

    pub async fn delete_older_than(
        &self,
        user_id: &ObjectId,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, mongodb::error::Error> {
        let result = self
            .collection
            .delete_many(doc! {
                "user_id": user_id,
                "created_at": { "$lt": bson::DateTime::from_chrono(cutoff) },
            })
            .await?;
        Ok(result.deleted_count)
    }
}
