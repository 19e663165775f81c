use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use codeport::config::{self, Settings};
use codeport::services::llm::LlmClient;
use codeport::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env();

    let db = config::database::connect(&settings.mongodb_uri, &settings.mongodb_database)
        .await
        .context("failed to configure MongoDB client")?;
    if let Err(e) = config::database::ensure_indexes(&db).await {
        warn!(error = %e, "could not create indexes; account routes will fail until MongoDB is reachable");
    }
    let redis = config::redis::client(&settings.redis_uri).context("invalid REDIS_URI")?;

    let llm = LlmClient::new(&settings.llm);
    if settings.llm.api_key.is_none() {
        warn!("no LLM API key configured; translations will return inline errors");
    }
    info!(base_url = %settings.llm.base_url, model = llm.default_model(), "LLM provider configured");

    let bind_address = settings.bind_address.clone();
    let state = AppState::new(db, redis, settings, Arc::new(llm));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(address = %bind_address, "server listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
