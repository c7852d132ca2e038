//! Chat completion providers.
//!
//! A provider takes the built [`GenerateContentRequest`] and returns either a
//! [`Completion`] or a [`CompletionError`]. Handlers never see an HTTP error
//! for upstream failures: [`ChatResponse`] folds both outcomes into one shape.

pub mod gemini;
pub mod mock;

use crate::services::chat::GenerateContentRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reply used when the upstream answer parses but carries no text.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response.";

/// Successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// First text part of the first candidate, or [`FALLBACK_REPLY`].
    pub text: String,

    /// Upstream body, pretty-printed when it is JSON.
    pub raw_response: String,
}

/// Error type for provider operations.
///
/// Variants raised after the upstream body was read keep that body so it can be
/// surfaced to the caller.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Failed to serialize chat request: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to create HTTP request: {0}")]
    BuildRequest(#[source] reqwest::Error),

    #[error("Failed to call chat completion API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to read chat completion response: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("Chat completion API returned error: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Failed to parse chat completion response: {source}")]
    Deserialize {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

impl CompletionError {
    /// Body received from upstream, if the call got that far.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::UpstreamStatus { body, .. } => Some(body),
            Self::Deserialize { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Serialize(_) => "serialize_error",
            Self::BuildRequest(_) => "request_error",
            Self::Transport(_) => "transport_error",
            Self::ReadBody(_) => "read_error",
            Self::UpstreamStatus { .. } => "upstream_error",
            Self::Deserialize { .. } => "parse_error",
        }
    }
}

/// Trait for chat completion backends (e.g., Gemini).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send one request. Single attempt, no retries.
    async fn complete(&self, request: &GenerateContentRequest)
        -> Result<Completion, CompletionError>;

    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;
}

/// Body returned by `POST /history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub ai_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        rename = "rawGeminiResponse",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_response: Option<String>,
}

impl From<Result<Completion, CompletionError>> for ChatResponse {
    fn from(result: Result<Completion, CompletionError>) -> Self {
        match result {
            Ok(completion) => Self {
                ai_message: completion.text,
                error: None,
                raw_response: non_empty(completion.raw_response),
            },
            Err(err) => Self {
                ai_message: String::new(),
                error: Some(err.to_string()),
                raw_response: err.raw_response().map(str::to_string).and_then(non_empty),
            },
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
