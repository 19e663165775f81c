use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::chat::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(controller::chat))
        .route("/chat/new", post(controller::new_chat))
        .route("/chat/history", get(controller::history))
}
