use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use crate::modules::subscription::model::Subscription;
use crate::modules::translation::model::TranslationRecord;
use crate::modules::users::model::User;

pub async fn connect(uri: &str, db_name: &str) -> Result<Database, mongodb::error::Error> {
    let client = Client::with_uri_str(uri).await?;
    Ok(client.database(db_name))
}

/// Uniqueness of username, email and API key lives in the database, not in
/// the handlers.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let users = db.collection::<User>("users");
    for field in ["username", "email", "api_key"] {
        let index = IndexModel::builder()
            .keys(doc! { field: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(index).await?;
    }

    db.collection::<TranslationRecord>("translations")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "created_at": -1 })
                .build(),
        )
        .await?;

    db.collection::<Subscription>("subscriptions")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "is_active": 1 })
                .build(),
        )
        .await?;

    Ok(())
}
