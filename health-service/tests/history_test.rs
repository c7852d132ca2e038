mod common;

use common::TestApp;
use health_service::services::chat::history_turn_text;
use health_service::services::providers::FALLBACK_REPLY;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/models/gemini-2.0-flash:generateContent";

#[tokio::test]
async fn chat_reply_is_returned_and_stored_on_the_same_row() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("Jane", "jane@example.com").await;

    let response = app.send_chat(user_id, "How much water?").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["aiMessage"], "Mock response for: How much water?");
    assert!(body.get("error").is_none());

    let history: Vec<Value> = app
        .get(&format!("/history/{}", user_id))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["user_id"].as_i64(), Some(user_id));
    assert_eq!(history[0]["text"], "How much water?");
    assert_eq!(history[0]["response"], body["aiMessage"]);
    assert_eq!(history[0]["sender"], "user");
    assert_eq!(history[0]["timestamp"], "2025-01-10T10:00:00Z");
}

#[tokio::test]
async fn prior_questions_are_sent_wrapped_and_in_order() {
    let app = TestApp::spawn().await;
    // Pad ids so the chatting user is number 7.
    for n in 1..7 {
        app.create_user("Filler", &format!("filler{}@example.com", n))
            .await;
    }
    let user_id = app.create_user("Jane", "jane@example.com").await;
    assert_eq!(user_id, 7);

    for text in ["A", "B", "C"] {
        app.send_chat(user_id, text).await;
    }

    let requests = app.mock.as_ref().unwrap().recorded_requests();
    assert_eq!(requests.len(), 3);

    let last: Vec<&str> = requests[2]
        .contents
        .iter()
        .filter_map(|c| c.text())
        .collect();
    assert_eq!(
        last,
        vec![
            history_turn_text("A").as_str(),
            history_turn_text("B").as_str(),
            "C"
        ]
    );
    assert!(requests[2].contents.iter().all(|c| c.role == "user"));
}

#[tokio::test]
async fn history_lists_rows_in_insertion_order() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("Jane", "jane@example.com").await;

    for text in ["first", "second", "third"] {
        app.send_chat(user_id, text).await;
    }

    let history: Vec<Value> = app
        .get(&format!("/history/{}", user_id))
        .await
        .json()
        .await
        .unwrap();

    let texts: Vec<&str> = history.iter().map(|m| m["text"].as_str().unwrap()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn sender_and_timestamp_default_when_omitted() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("Jane", "jane@example.com").await;

    let response = app
        .post_json("/history", &json!({ "user_id": user_id, "text": "hi" }))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let history: Vec<Value> = app
        .get(&format!("/history/{}", user_id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(history[0]["sender"], "user");
    assert_eq!(history[0]["timestamp"], "");
}

#[tokio::test]
async fn chat_for_unknown_user_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app.send_chat(99, "hello").await;

    assert_eq!(response.status().as_u16(), 404);
    assert!(app.mock.as_ref().unwrap().recorded_requests().is_empty());
}

#[tokio::test]
async fn malformed_chat_body_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/history"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn gemini_reply_flows_through_to_the_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "Aim for 2 litres." }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::spawn_with_gemini(server.uri()).await;
    let user_id = app.create_user("Jane", "jane@example.com").await;

    let body: Value = app
        .send_chat(user_id, "How much water?")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["aiMessage"], "Aim for 2 litres.");
    assert!(body["rawGeminiResponse"]
        .as_str()
        .unwrap()
        .contains("Aim for 2 litres."));
}

#[tokio::test]
async fn upstream_failure_is_reported_in_a_200_and_row_is_kept() {
    let server = MockServer::start().await;
    let upstream_body = r#"{"error":{"code":500,"message":"Internal error encountered."}}"#;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string(upstream_body))
        .mount(&server)
        .await;

    let app = TestApp::spawn_with_gemini(server.uri()).await;
    let user_id = app.create_user("Jane", "jane@example.com").await;

    let response = app.send_chat(user_id, "hello").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["aiMessage"], "");
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert_eq!(body["rawGeminiResponse"], upstream_body);

    let history: Vec<Value> = app
        .get(&format!("/history/{}", user_id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["text"], "hello");
    assert_eq!(history[0]["response"], "");
}

#[tokio::test]
async fn empty_candidates_store_the_fallback_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let app = TestApp::spawn_with_gemini(server.uri()).await;
    let user_id = app.create_user("Jane", "jane@example.com").await;

    let body: Value = app.send_chat(user_id, "hello").await.json().await.unwrap();
    assert_eq!(body["aiMessage"], FALLBACK_REPLY);

    let stored = app.store_messages(user_id).await;
    assert_eq!(stored[0].response, FALLBACK_REPLY);
}

#[tokio::test]
async fn long_client_timestamp_is_stored_verbatim() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("Jane", "jane@example.com").await;
    let timestamp = format!("2025-01-10T10:00:00.{}+00:00", "0".repeat(60));

    let response = app
        .post_json(
            "/history",
            &json!({ "user_id": user_id, "text": "hi", "timestamp": timestamp }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let stored = app.store_messages(user_id).await;
    assert_eq!(stored[0].timestamp, timestamp);
}
