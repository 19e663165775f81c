//! Quota and registration paths that need a real MongoDB. Each test skips
//! when `MONGODB_URI` is unset.

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use bson::oid::ObjectId;
use codeport::modules::translation::crud::TranslationCrud;
use codeport::modules::translation::model::TranslationRecord;
use codeport::modules::users::crud::{is_duplicate_key, UserCrud};
use codeport::modules::users::model::{Profile, User};
use common::{setup_live, translator_llm};
use serde_json::{json, Value};

const CHAT_TRANSLATION: &str = "translate this from python to javascript: ```print('hi')```";

/// Registers a user and returns `(user_id, api_key)`.
async fn register(server: &TestServer, username: &str) -> (ObjectId, String) {
    let response = server
        .post("/api/users/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct horse",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let user_id = ObjectId::parse_str(body["user_id"].as_str().unwrap()).unwrap();
    (user_id, body["api_key"].as_str().unwrap().to_string())
}

fn key_header(api_key: &str) -> (HeaderName, HeaderValue) {
    (HeaderName::from_static("x-api-key"), HeaderValue::from_str(api_key).unwrap())
}

async fn use_up_quota(crud: &TranslationCrud, user_id: ObjectId, count: usize) {
    for _ in 0..count {
        let record = TranslationRecord::new(
            user_id,
            "print(1)".to_string(),
            "console.log(1);".to_string(),
            "python".to_string(),
            "javascript".to_string(),
            None,
        );
        crud.create(record).await.unwrap();
    }
}

#[tokio::test]
async fn test_chat_translation_counts_against_the_monthly_limit() {
    let Some((server, db)) = setup_live(translator_llm()).await else {
        return;
    };
    let (user_id, api_key) = register(&server, "grace").await;
    let crud = TranslationCrud::new(&db);

    let (name, value) = key_header(&api_key);
    server
        .post("/chat")
        .add_header(name, value)
        .json(&json!({ "message": CHAT_TRANSLATION }))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(crud.count_for_user(&user_id).await.unwrap(), 1);

    // Plain chat is free.
    let (name, value) = key_header(&api_key);
    server
        .post("/chat")
        .add_header(name, value)
        .json(&json!({ "message": "What is a closure?" }))
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(crud.count_for_user(&user_id).await.unwrap(), 1);

    use_up_quota(&crud, user_id, 99).await;

    let (name, value) = key_header(&api_key);
    let response = server
        .post("/chat")
        .add_header(name, value)
        .json(&json!({ "message": CHAT_TRANSLATION }))
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["limit"], 100);
    assert_eq!(body["used"], 100);
    assert_eq!(crud.count_for_user(&user_id).await.unwrap(), 100);

    db.drop().await.unwrap();
}

#[tokio::test]
async fn test_feedback_is_refused_once_the_limit_is_reached() {
    let llm = translator_llm();
    let Some((server, db)) = setup_live(llm.clone()).await else {
        return;
    };
    let (user_id, api_key) = register(&server, "hopper").await;
    let crud = TranslationCrud::new(&db);
    use_up_quota(&crud, user_id, 100).await;

    let (name, value) = key_header(&api_key);
    server
        .post("/feedback")
        .add_header(name, value)
        .json(&json!({
            "source_code": "print(1)",
            "translated_code": "console.log(1);",
            "source_language": "python",
            "target_language": "javascript",
        }))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    assert!(llm.prompts().is_empty());
    assert_eq!(crud.count_for_user(&user_id).await.unwrap(), 100);

    db.drop().await.unwrap();
}

#[tokio::test]
async fn test_unique_index_rejects_a_second_user_with_the_same_name() {
    let Some((server, db)) = setup_live(translator_llm()).await else {
        return;
    };
    let users = UserCrud::new(&db);
    let user = |email: &str| User::new("lovelace".to_string(), email.to_string(), "hash".to_string(), Profile::default());

    users.create(user("ada@example.com")).await.unwrap();
    let err = users.create(user("other@example.com")).await.unwrap_err();
    assert!(is_duplicate_key(&err));

    server
        .post("/api/users/register")
        .json(&json!({ "username": "lovelace", "email": "third@example.com", "password": "correct horse" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    db.drop().await.unwrap();
}
