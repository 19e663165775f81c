use axum::{
    routing::{get, post},
    Router,
};

use crate::modules::users::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(controller::register))
        .route("/api/users/login", post(controller::login))
        .route(
            "/api/users/profile",
            get(controller::get_profile).put(controller::update_profile),
        )
}
