use std::sync::Arc;

use axum::Router;
use mongodb::Database;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod modules;
pub mod services;

use config::Settings;
use services::assistant::ChatAssistant;
use services::conversation::ConversationStore;
use services::llm::TextGenerator;
use services::stripe::StripeClient;
use services::token::TokenSigner;
use services::translator::Translator;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub redis: redis::Client,
    pub settings: Arc<Settings>,
    pub llm: Arc<dyn TextGenerator>,
    pub conversations: ConversationStore,
    pub tokens: TokenSigner,
    pub stripe: StripeClient,
}

impl AppState {
    pub fn new(db: Database, redis: redis::Client, settings: Settings, llm: Arc<dyn TextGenerator>) -> Self {
        Self {
            tokens: TokenSigner::new(&settings.jwt_secret, settings.token_expiry_days),
            stripe: StripeClient::new(settings.stripe.clone()),
            conversations: ConversationStore::new(),
            settings: Arc::new(settings),
            db,
            redis,
            llm,
        }
    }

    pub fn translator(&self) -> Translator {
        Translator::new(Arc::clone(&self.llm))
    }

    pub fn assistant(&self) -> ChatAssistant {
        ChatAssistant::new(self.settings.assistant_name.clone(), Arc::clone(&self.llm))
    }
}

/// Every route, plus static files, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(modules::catalog::routes::routes())
        .merge(modules::translation::routes::routes())
        .merge(modules::chat::routes::routes())
        .merge(modules::users::routes::routes())
        .merge(modules::subscription::routes::routes())
        .merge(modules::billing::routes::routes())
        .nest_service("/static", ServeDir::new(&state.settings.static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
