//! Purges translation history older than each user's plan retention.
//!
//! Run with: cargo run --bin cleanup

use chrono::{Duration, Utc};

use codeport::config::{self, Settings};
use codeport::modules::subscription::crud::SubscriptionCrud;
use codeport::modules::subscription::model::{find_plan, DEFAULT_PLAN};
use codeport::modules::translation::crud::TranslationCrud;
use codeport::modules::users::crud::UserCrud;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();

    println!("Connecting to MongoDB...");
    let db = config::database::connect(&settings.mongodb_uri, &settings.mongodb_database).await?;

    let subscriptions = SubscriptionCrud::new(&db);
    let translations = TranslationCrud::new(&db);
    let users = UserCrud::new(&db).find_active().await?;
    println!("Checking {} users", users.len());

    let mut purged = 0;
    for user in users {
        let Some(user_id) = user.id else { continue };
        let plan = match subscriptions.find_active(&user_id).await? {
            Some(subscription) => subscription.plan(),
            None => match find_plan(DEFAULT_PLAN) {
                Some(plan) => plan,
                None => continue,
            },
        };

        let cutoff = Utc::now() - Duration::days(plan.history_retention_days);
        let deleted = translations.delete_older_than(&user_id, cutoff).await?;
        if deleted > 0 {
            println!("  - {}: {} translations older than {} days", user.username, deleted, plan.history_retention_days);
        }
        purged += deleted;
    }

    println!("\n✓ Cleanup complete, {} translations removed", purged);
    Ok(())
}
