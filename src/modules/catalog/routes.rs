use axum::{routing::get, Router};

use crate::modules::catalog::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(controller::root))
        .route("/health", get(controller::health))
        .route("/languages", get(controller::list_languages))
        .route("/models", get(controller::list_models))
}
