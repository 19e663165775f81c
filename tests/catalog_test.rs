mod common;

use axum::http::StatusCode;
use common::{api_key_header, setup_test_server, translator_llm};

#[tokio::test]
async fn test_root_and_health_need_no_key() {
    let server = setup_test_server(translator_llm()).await;

    let root = server.get("/").await;
    root.assert_status(StatusCode::OK);
    let body: serde_json::Value = root.json();
    assert_eq!(body["message"], "Code Translator API");

    let health = server.get("/health").await;
    health.assert_status(StatusCode::OK);
    let body: serde_json::Value = health.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_languages_without_key_is_rejected() {
    let server = setup_test_server(translator_llm()).await;

    let response = server.get("/languages").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Invalid API Key");
}

#[tokio::test]
async fn test_blank_key_is_rejected() {
    let server = setup_test_server(translator_llm()).await;

    let response = server
        .get("/models")
        .add_header(
            axum::http::HeaderName::from_static("x-api-key"),
            axum::http::HeaderValue::from_static("   "),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_languages() {
    let server = setup_test_server(translator_llm()).await;
    let (name, value) = api_key_header();

    let response = server.get("/languages").add_header(name, value).await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let languages = body["languages"].as_array().unwrap();
    assert_eq!(languages.len(), 12);
    assert_eq!(languages[0]["id"], "python");
    assert_eq!(languages[0]["name"], "Python");
    assert!(languages.iter().any(|l| l["id"] == "cpp" && l["name"] == "C++"));
}

#[tokio::test]
async fn test_list_models() {
    let server = setup_test_server(translator_llm()).await;
    let (name, value) = api_key_header();

    let response = server.get("/models").add_header(name, value).await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["default_model"], "llama-3.3-70b-versatile");
    let models = body["models"].as_array().unwrap();
    assert!(!models.is_empty());
    for model in models {
        assert!(model["id"].is_string());
        assert!(model["name"].is_string());
        assert!(model["description"].is_string());
        assert!(model["context_length"].as_u64().unwrap() > 0);
    }
}

#[tokio::test]
async fn test_static_files_are_served() {
    let server = setup_test_server(translator_llm()).await;

    let response = server.get("/static/index.html").await;

    response.assert_status(StatusCode::OK);
    assert!(response.text().contains("Code Translator API"));
    server.get("/static/missing.html").await.assert_status(StatusCode::NOT_FOUND);
}
