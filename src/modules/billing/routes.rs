use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::billing::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/billing/plans", get(controller::list_plans))
        .route("/api/billing/checkout", post(controller::checkout))
        .route("/stripe/webhook", post(controller::webhook))
}
