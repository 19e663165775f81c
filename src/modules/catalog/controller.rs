use axum::extract::State;
use axum::Json;

use crate::modules::auth::guard::ApiKeyAuth;
use crate::modules::catalog::{
    model::{Language, MODELS},
    schema::{BannerResponse, HealthResponse, LanguageInfo, LanguagesResponse, ModelsResponse},
};
use crate::AppState;

pub async fn root() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Code Translator API",
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

pub async fn list_languages(_auth: ApiKeyAuth) -> Json<LanguagesResponse> {
    let languages = Language::all()
        .into_iter()
        .map(|l| LanguageInfo {
            id: l.as_str(),
            name: l.display_name(),
        })
        .collect();

    Json(LanguagesResponse { languages })
}

pub async fn list_models(State(state): State<AppState>, _auth: ApiKeyAuth) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: MODELS.to_vec(),
        default_model: state.settings.llm.default_model.clone(),
    })
}
