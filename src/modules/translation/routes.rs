use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::translation::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/translate", post(controller::translate))
        .route("/feedback", post(controller::feedback))
        .route("/api/translations/history", get(controller::history))
        .route("/api/translations/limit", get(controller::limit))
}
