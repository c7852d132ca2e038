//! Mock chat provider for tests and offline development.

use super::{ChatProvider, Completion, CompletionError};
use crate::services::chat::GenerateContentRequest;
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Answers every request locally and records what it was asked.
#[derive(Clone, Default)]
pub struct MockChatProvider {
    reply: Option<String>,
    requests: Arc<Mutex<Vec<GenerateContentRequest>>>,
}

impl MockChatProvider {
    /// Echoes `Mock response for: <current message>`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answers with `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Self::default()
        }
    }

    /// Requests received so far, oldest first.
    pub fn recorded_requests(&self) -> Vec<GenerateContentRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<Completion, CompletionError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        let text = self.reply.clone().unwrap_or_else(|| {
            format!(
                "Mock response for: {}",
                request.current_message().unwrap_or_default()
            )
        });

        let raw = json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        });

        Ok(Completion {
            raw_response: serde_json::to_string_pretty(&raw).map_err(CompletionError::Serialize)?,
            text,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
