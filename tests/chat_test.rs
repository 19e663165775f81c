mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{api_key_header, setup_test_server, translator_llm, ScriptedLlm};
use serde_json::{json, Value};

async fn send(server: &TestServer, body: Value) -> Value {
    let (name, value) = api_key_header();
    let response = server.post("/chat").add_header(name, value).json(&body).await;
    response.assert_status(StatusCode::OK);
    response.json()
}

async fn history(server: &TestServer, conversation_id: &str) -> Vec<Value> {
    let (name, value) = api_key_header();
    let response = server
        .get("/chat/history")
        .add_query_param("conversation_id", conversation_id)
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    body["history"].as_array().unwrap().clone()
}

#[tokio::test]
async fn test_new_chat_returns_greeting() {
    let server = setup_test_server(translator_llm()).await;
    let (name, value) = api_key_header();

    let response = server.post("/chat/new").add_header(name, value).await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert!(body["response"].as_str().unwrap().starts_with("Hi! I'm Polly"));
    assert_eq!(body["conversation_id"], "service_conv_1");
}

#[tokio::test]
async fn test_chat_without_id_answers_the_message() {
    let llm = translator_llm();
    let server = setup_test_server(llm.clone()).await;

    let body = send(&server, json!({ "message": "What is a closure?" })).await;

    // The reply is the answer, not the greeting that seeds the conversation.
    assert!(!body["response"].as_str().unwrap().starts_with("Hi! I'm Polly"));
    assert_eq!(body["response"], "Happy to help!");
    let conversation_id = body["conversation_id"].as_str().unwrap().to_string();

    let turns = history(&server, &conversation_id).await;
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0]["role"], "assistant");
    assert_eq!(turns[1], json!({ "role": "user", "content": "What is a closure?" }));
    assert_eq!(turns[2], json!({ "role": "assistant", "content": "Happy to help!" }));

    let prompt = &llm.prompts()[0];
    assert!(prompt.contains("You are Polly"));
    assert!(prompt.trim_end().ends_with("User: What is a closure?\nPolly:"));
}

#[tokio::test]
async fn test_chat_continues_a_conversation() {
    let llm = translator_llm();
    let server = setup_test_server(llm.clone()).await;

    let first = send(&server, json!({ "message": "hello" })).await;
    let conversation_id = first["conversation_id"].as_str().unwrap();

    let second = send(&server, json!({ "message": "and again", "conversation_id": conversation_id })).await;
    assert_eq!(second["conversation_id"], conversation_id);

    // The second prompt carries the first exchange.
    let prompts = llm.prompts();
    assert!(prompts[1].contains("User: hello\n"));
    assert!(prompts[1].contains("Polly: Happy to help!\n"));
    assert_eq!(history(&server, conversation_id).await.len(), 5);
}

#[tokio::test]
async fn test_unknown_conversation_id_starts_fresh() {
    let server = setup_test_server(translator_llm()).await;

    let body = send(&server, json!({ "message": "hi", "conversation_id": "someone_conv_99" })).await;

    assert_ne!(body["conversation_id"], "someone_conv_99");
    assert!(body["conversation_id"].as_str().unwrap().starts_with("service_conv_"));
}

#[tokio::test]
async fn test_chat_translation_request_uses_translator() {
    let llm = translator_llm();
    let server = setup_test_server(llm.clone()).await;

    let body = send(
        &server,
        json!({ "message": "translate this from python to javascript: ```print('hi')```" }),
    )
    .await;

    let reply = body["response"].as_str().unwrap();
    assert!(reply.starts_with("Here's your translated code from python to javascript:"));
    assert!(reply.contains("```javascript\nconsole.log('hi');\n```"));
    assert!(llm.prompts()[0].starts_with("Translate the following python code to javascript"));
}

#[tokio::test]
async fn test_history_is_bounded() {
    let server = setup_test_server(translator_llm()).await;

    let first = send(&server, json!({ "message": "message 0" })).await;
    let conversation_id = first["conversation_id"].as_str().unwrap().to_string();
    for i in 1..15 {
        send(&server, json!({ "message": format!("message {i}"), "conversation_id": conversation_id })).await;
    }

    let turns = history(&server, &conversation_id).await;
    assert_eq!(turns.len(), 20);
    assert_eq!(turns.last().unwrap()["content"], "Happy to help!");
    assert_eq!(turns[turns.len() - 2]["content"], "message 14");
}

#[tokio::test]
async fn test_history_lookups() {
    let server = setup_test_server(translator_llm()).await;

    let (name, value) = api_key_header();
    server
        .get("/chat/history")
        .add_query_param("conversation_id", "missing_conv_1")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    send(&server, json!({ "message": "one" })).await;
    send(&server, json!({ "message": "two" })).await;

    let (name, value) = api_key_header();
    let response = server.get("/chat/history").add_header(name, value).await;
    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["conversations"].as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chat_validation_and_failures() {
    let server = setup_test_server(ScriptedLlm::failing()).await;

    let (name, value) = api_key_header();
    server
        .post("/chat")
        .add_header(name, value)
        .json(&json!({ "message": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let (name, value) = api_key_header();
    server
        .post("/chat")
        .add_header(name, value)
        .json(&json!({ "message": "x".repeat(20_001) }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/chat")
        .json(&json!({ "message": "hi" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let body = send(&server, json!({ "message": "hi" })).await;
    assert!(body["response"].as_str().unwrap().starts_with("I'm sorry"));
}
