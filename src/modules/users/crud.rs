use crate::modules::users::model::{Profile, User};
use bson::{doc, oid::ObjectId};
use mongodb::error::{Error, ErrorKind, WriteFailure};
use mongodb::{Collection, Database};

const COLLECTION_NAME: &str = "users";
const DUPLICATE_KEY: i32 = 11000;

/// True when a write lost against one of the unique user indexes.
pub fn is_duplicate_key(error: &Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

pub struct UserCrud {
    collection: Collection<User>,
}

impl UserCrud {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION_NAME),
        }
    }

    pub async fn create(&self, user: User) -> Result<Option<ObjectId>, mongodb::error::Error> {
        let result = self.collection.insert_one(user).await?;
        Ok(result.inserted_id.as_object_id())
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<(), mongodb::error::Error> {
        self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, mongodb::error::Error> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_by_login(&self, username_or_email: &str) -> Result<Option<User>, mongodb::error::Error> {
        self.collection
            .find_one(doc! {
                "$or": [
                    { "username": username_or_email },
                    { "email": username_or_email },
                ]
            })
            .await
    }

    pub async fn exists(&self, username: &str, email: &str) -> Result<bool, mongodb::error::Error> {
        let count = self
            .collection
            .count_documents(doc! {
                "$or": [
                    { "username": username },
                    { "email": email },
                ]
            })
            .await?;
        Ok(count > 0)
    }

    pub async fn find_active_by_api_key(&self, api_key: &str) -> Result<Option<User>, mongodb::error::Error> {
        self.collection
            .find_one(doc! { "api_key": api_key, "is_active": true })
            .await
    }

    pub async fn find_active(&self) -> Result<Vec<User>, mongodb::error::Error> {
        use futures::TryStreamExt;

        let cursor = self.collection.find(doc! { "is_active": true }).await?;
        cursor.try_collect().await
    }

    pub async fn touch_last_login(&self, id: &ObjectId) -> Result<(), mongodb::error::Error> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "last_login": bson::DateTime::now() } },
            )
            .await?;
        Ok(())
    }

    pub async fn update_profile(&self, id: &ObjectId, profile: &Profile) -> Result<bool, mongodb::error::Error> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "profile.first_name": profile.first_name.clone(),
                        "profile.last_name": profile.last_name.clone(),
                        "profile.company": profile.company.clone(),
                        "profile.website": profile.website.clone(),
                    }
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn set_account_type(&self, id: &ObjectId, plan_id: &str) -> Result<bool, mongodb::error::Error> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": { "account_type": plan_id } })
            .await?;
        Ok(result.matched_count > 0)
    }
}
