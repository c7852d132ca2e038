#![allow(dead_code)]

use health_service::config::{GeminiConfig, HealthConfig};
use health_service::models::ChatMessage;
use health_service::services::{
    init_metrics, ChatProvider, GeminiProvider, HealthStore, InMemoryStore, MockChatProvider,
};
use health_service::startup::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

fn init_test_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("warn,health_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
        init_metrics();
    });
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: InMemoryStore,
    /// Set when the app runs on the mock chat provider.
    pub mock: Option<MockChatProvider>,
}

impl TestApp {
    /// In-memory store and echoing mock provider.
    pub async fn spawn() -> Self {
        let mock = MockChatProvider::new();
        Self::spawn_with(Arc::new(mock.clone()), Some(mock)).await
    }

    /// In-memory store and a Gemini provider pointed at `api_base`.
    pub async fn spawn_with_gemini(api_base: String) -> Self {
        let provider = GeminiProvider::new(GeminiConfig {
            api_key: Some(Secret::new("test-key".to_string())),
            api_base,
            timeout_secs: 5,
            ..GeminiConfig::default()
        })
        .expect("Failed to build Gemini provider");

        Self::spawn_with(Arc::new(provider), None).await
    }

    async fn spawn_with(chat: Arc<dyn ChatProvider>, mock: Option<MockChatProvider>) -> Self {
        init_test_tracing();

        let mut config = HealthConfig::default();
        config.common.host = "127.0.0.1".to_string();
        config.common.port = 0; // Random port for testing

        let store = InMemoryStore::new();
        let app = Application::build_with(
            config,
            Arc::new(store.clone()) as Arc<dyn HealthStore>,
            chat,
        )
        .await
        .expect("Failed to build test application");

        let address = format!("http://127.0.0.1:{}", app.http_port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            client: reqwest::Client::new(),
            store,
            mock,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a user and return its id.
    pub async fn create_user(&self, name: &str, email: &str) -> i64 {
        let response = self
            .post_json("/user", &json!({ "name": name, "email": email }))
            .await;
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["id"].as_i64().expect("User id missing")
    }

    /// Chat rows as persisted, bypassing HTTP.
    pub async fn store_messages(&self, user_id: i64) -> Vec<ChatMessage> {
        self.store
            .list_chat_messages(user_id)
            .await
            .expect("Failed to read chat rows")
    }

    pub async fn send_chat(&self, user_id: i64, text: &str) -> reqwest::Response {
        self.post_json(
            "/history",
            &json!({
                "user_id": user_id,
                "text": text,
                "sender": "user",
                "timestamp": "2025-01-10T10:00:00Z"
            }),
        )
        .await
    }
}
