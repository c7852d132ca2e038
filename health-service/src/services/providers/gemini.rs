//! Gemini chat provider.
//!
//! Sends the built multi-turn payload to `models/{model}:generateContent` and
//! extracts the first text part of the first candidate.

use super::{ChatProvider, Completion, CompletionError, FALLBACK_REPLY};
use crate::config::GeminiConfig;
use crate::services::chat::GenerateContentRequest;
use crate::services::metrics::{CHAT_COMPLETIONS_TOTAL, CHAT_COMPLETION_DURATION};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

/// Gemini chat provider.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the configured model.
    fn api_url(&self) -> String {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .unwrap_or_default();

        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            api_key
        )
    }

    async fn send(&self, request: &GenerateContentRequest) -> Result<Completion, CompletionError> {
        let payload = serde_json::to_vec(request).map_err(CompletionError::Serialize)?;

        let http_request = self
            .client
            .post(self.api_url())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .build()
            .map_err(CompletionError::BuildRequest)?;

        let response = self
            .client
            .execute(http_request)
            .await
            .map_err(CompletionError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(CompletionError::ReadBody)?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body = %body, "Gemini API error response");
            return Err(CompletionError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let api_response: GenerateContentResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(source) => return Err(CompletionError::Deserialize { source, raw: body }),
        };

        let raw_response = pretty_body(&body);

        let text = api_response.first_text().map(str::to_string);
        if text.is_none() {
            tracing::warn!(
                candidates = api_response.candidates.as_ref().map_or(0, Vec::len),
                "Gemini response carried no text, using fallback reply"
            );
        }

        Ok(Completion {
            text: text.unwrap_or_else(|| FALLBACK_REPLY.to_string()),
            raw_response,
        })
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %self.config.model, turns = request.contents.len()))]
    async fn complete(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<Completion, CompletionError> {
        let timer = CHAT_COMPLETION_DURATION
            .with_label_values(&[self.name()])
            .start_timer();

        tracing::debug!("Sending request to Gemini API");
        let result = self.send(request).await;

        timer.observe_duration();

        let outcome = match &result {
            Ok(completion) if completion.text == FALLBACK_REPLY => "fallback",
            Ok(_) => "ok",
            Err(e) => {
                tracing::error!(error = %e, kind = e.kind(), "Gemini call failed");
                e.kind()
            }
        };
        CHAT_COMPLETIONS_TOTAL
            .with_label_values(&[self.name(), outcome])
            .inc();

        result
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Re-indent a JSON body for diagnostics; non-JSON bodies are returned as-is.
fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

// ============================================================================
// Gemini API Response Types
// ============================================================================

// Absent and `null` collections are both read as empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

impl GenerateContentResponse {
    /// First non-empty text part of the first candidate. Parts without text
    /// (function calls, inline data) are skipped.
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .as_deref()
            .and_then(<[Candidate]>::first)
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.as_deref())
            .and_then(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .find(|text| !text.is_empty())
            })
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
