use crate::modules::subscription::model::Subscription;
use bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

const COLLECTION_NAME: &str = "subscriptions";

pub struct SubscriptionCrud {
    collection: Collection<Subscription>,
}

impl SubscriptionCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_NAME),
        }
    }

    pub async fn find_active(&self, user_id: &ObjectId) -> Result<Option<Subscription>, mongodb::error::Error> {
        self.collection
            .find_one(doc! { "user_id": user_id, "is_active": true })
            .await
    }

    /// Deactivates whatever is active for the user, then inserts the new row,
    /// leaving at most one active subscription.
    pub async fn replace_active(&self, subscription: Subscription) -> Result<Option<ObjectId>, mongodb::error::Error> {
        self.collection
            .update_many(
                doc! { "user_id": subscription.user_id, "is_active": true },
                doc! { "$set": { "is_active": false } },
            )
            .await?;

        let result = self.collection.insert_one(subscription).await?;
        Ok(result.inserted_id.as_object_id())
    }
}
