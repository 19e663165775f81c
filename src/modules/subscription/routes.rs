use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::subscription::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/subscriptions/plans", get(controller::list_plans))
        .route("/api/subscriptions", post(controller::subscribe))
}
