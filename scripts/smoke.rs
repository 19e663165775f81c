//! Sends one translation to a running server and prints the reply.
//!
//! Run with: cargo run --bin smoke
//! Reads SMOKE_URL (default http://127.0.0.1:8080) and SMOKE_API_KEY, falling
//! back to the first entry of API_KEYS.

use std::env;
use std::time::Instant;

use anyhow::{bail, Context};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_code: String,
    feedback: String,
    translations_remaining: serde_json::Value,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let base_url = env::var("SMOKE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let api_key = env::var("SMOKE_API_KEY")
        .ok()
        .or_else(|| {
            env::var("API_KEYS")
                .ok()
                .and_then(|keys| keys.split(',').next().map(|k| k.trim().to_string()))
        })
        .filter(|k| !k.is_empty())
        .context("set SMOKE_API_KEY or API_KEYS")?;

    let client = Client::new();

    let health = client.get(format!("{base_url}/health")).send().await?;
    println!("health: {}", health.status());

    let source = "def add(a, b):\n    return a + b\n\nprint(add(2, 3))";
    println!("\nTranslating python -> rust:\n{source}\n");

    let start = Instant::now();
    let response = client
        .post(format!("{base_url}/translate"))
        .header("X-API-Key", api_key)
        .json(&json!({
            "source_code": source,
            "source_language": "python",
            "target_language": "rust",
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        bail!("translate returned {}: {}", status, response.text().await.unwrap_or_default());
    }

    let result: TranslateResponse = response.json().await?;
    println!("--- translated ({:.2?}) ---\n{}", start.elapsed(), result.translated_code);
    println!("\n--- feedback ---\n{}", result.feedback);
    println!("\nremaining: {}", result.translations_remaining);
    Ok(())
}
