#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use codeport::config::settings::{LlmSettings, StripeSettings};
use codeport::config::Settings;
use codeport::services::llm::{GenerationOptions, LlmError, TextGenerator};
use codeport::{app, AppState};
use mongodb::Database;

pub const API_KEY: &str = "test-service-key";
pub const JWT_SECRET: &str = "test-jwt-secret";

type Reply = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

/// Stands in for the hosted model: answers every prompt with `reply` and
/// remembers what it was asked.
pub struct ScriptedLlm {
    reply: Box<Reply>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(reply: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::new(|_| Err(LlmError::ApiError("upstream exploded".to_string())))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedLlm {
    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)(prompt)
    }
}

/// Answers translation prompts with a fenced block and everything else with
/// plain text.
pub fn translator_llm() -> Arc<ScriptedLlm> {
    ScriptedLlm::new(|prompt| {
        if prompt.starts_with("Translate the following") {
            Ok("Sure!\n```javascript\nconsole.log('hi');\n```\nDone.".to_string())
        } else if prompt.starts_with("Analyze the following") {
            Ok("  Accurate and idiomatic.  ".to_string())
        } else {
            Ok("Happy to help!".to_string())
        }
    })
}

pub fn test_settings(webhook_secret: Option<&str>) -> Settings {
    Settings {
        bind_address: "127.0.0.1:0".to_string(),
        mongodb_uri: "mongodb://127.0.0.1:27017".to_string(),
        mongodb_database: "codeport_test".to_string(),
        redis_uri: "redis://127.0.0.1:6379".to_string(),
        llm: LlmSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            default_model: "llama-3.3-70b-versatile".to_string(),
        },
        api_keys: vec![API_KEY.to_string()],
        jwt_secret: JWT_SECRET.to_string(),
        token_expiry_days: 7,
        stripe: StripeSettings {
            api_key: None,
            webhook_secret: webhook_secret.map(str::to_string),
            api_base: "http://127.0.0.1:9".to_string(),
            success_url: "https://example.com/success".to_string(),
            cancel_url: "https://example.com/cancel".to_string(),
        },
        static_dir: "static".to_string(),
        assistant_name: "Polly".to_string(),
    }
}

/// The MongoDB and Redis clients are lazy, so routes that never reach storage
/// run without either server.
pub async fn setup_with(llm: Arc<ScriptedLlm>, settings: Settings) -> TestServer {
    let db = codeport::config::database::connect(&settings.mongodb_uri, &settings.mongodb_database)
        .await
        .unwrap();
    let redis = codeport::config::redis::client(&settings.redis_uri).unwrap();

    let state = AppState::new(db, redis, settings, llm);
    TestServer::new(app(state)).unwrap()
}

/// A server backed by a throwaway database on the MongoDB at `MONGODB_URI`.
/// `None` when the variable is unset, so storage tests skip instead of fail.
pub async fn setup_live(llm: Arc<ScriptedLlm>) -> Option<(TestServer, Database)> {
    let Ok(uri) = std::env::var("MONGODB_URI") else {
        eprintln!("MONGODB_URI not set, skipping");
        return None;
    };
    let mut settings = test_settings(None);
    settings.mongodb_uri = uri;
    settings.mongodb_database = format!("codeport_test_{}", uuid::Uuid::new_v4().simple());

    let db = codeport::config::database::connect(&settings.mongodb_uri, &settings.mongodb_database)
        .await
        .unwrap();
    codeport::config::database::ensure_indexes(&db).await.unwrap();
    let redis = codeport::config::redis::client(&settings.redis_uri).unwrap();

    let state = AppState::new(db.clone(), redis, settings, llm);
    Some((TestServer::new(app(state)).unwrap(), db))
}

pub async fn setup_test_server(llm: Arc<ScriptedLlm>) -> TestServer {
    setup_with(llm, test_settings(None)).await
}

pub fn api_key_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-api-key"),
        HeaderValue::from_static(API_KEY),
    )
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        axum::http::header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}
