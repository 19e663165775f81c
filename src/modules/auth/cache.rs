//! Redis cache for API-key lookups.
//!
//! Entries are keyed by the SHA-256 of the key so raw keys never land in
//! Redis. Every failure here is soft: the caller falls back to MongoDB.

use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::modules::auth::guard::UserIdentity;

const CACHE_TTL: u64 = 300;

fn cache_key(api_key: &str) -> String {
    format!("api_key:{}", hex::encode(Sha256::digest(api_key.as_bytes())))
}

pub async fn get(client: &redis::Client, api_key: &str) -> Option<UserIdentity> {
    let mut conn = match client.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!(error = %e, "redis unavailable, skipping api key cache");
            return None;
        }
    };

    let cached = conn.get::<_, Option<String>>(cache_key(api_key)).await.ok()?;
    serde_json::from_str(&cached?).ok()
}

pub async fn put(client: &redis::Client, api_key: &str, identity: &UserIdentity) {
    let Ok(json) = serde_json::to_string(identity) else {
        return;
    };
    if let Ok(mut conn) = client.get_multiplexed_async_connection().await {
        let _: Result<(), _> = conn.set_ex(cache_key(api_key), json, CACHE_TTL).await;
    }
}

/// Drops the cached identity so the next request re-reads plan and limits.
pub async fn invalidate(client: &redis::Client, api_key: &str) {
    match client.get_multiplexed_async_connection().await {
        Ok(mut conn) => {
            let result = conn.del::<_, ()>(cache_key(api_key)).await;
            if let Err(e) = result {
                warn!(error = %e, "failed to invalidate api key cache");
            }
        }
        Err(e) => warn!(error = %e, "redis unavailable, api key cache not invalidated"),
    }
}
