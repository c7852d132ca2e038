//! Chat request construction.
//!
//! Folds a user's stored chat rows and a new message into the multi-turn
//! `generateContent` payload. Prior rows are restated as questions only: the
//! model replies stored on those rows are not sent back, so the model sees a
//! list of past questions rather than a true dialogue.

use crate::models::ChatMessage;
use serde::{Deserialize, Serialize};

/// Role label applied to every turn, historical or current.
pub const TURN_ROLE: &str = "user";

/// Output-format hint sent with every request.
pub const RESPONSE_MIME_TYPE: &str = "text/plain";

const HISTORY_INSTRUCTION: &str =
    "use previous history which i am passing and answer in 50 words for the question -- ";

/// `generateContent` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

/// One role-tagged turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
}

impl Content {
    /// Single-part turn tagged with [`TURN_ROLE`].
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: TURN_ROLE.to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Text of the first part, if any.
    pub fn text(&self) -> Option<&str> {
        self.parts.first().map(|p| p.text.as_str())
    }
}

impl GenerateContentRequest {
    /// Text of the final turn, i.e. the message being answered.
    pub fn current_message(&self) -> Option<&str> {
        self.contents.last().and_then(Content::text)
    }
}

/// Wrap a historical question in the context instruction.
pub fn history_turn_text(text: &str) -> String {
    format!("{}{}", HISTORY_INSTRUCTION, text)
}

/// Build the payload for `current`, preceded by one wrapped turn per prior row.
///
/// `history` is used in the order given; the store returns rows in insertion
/// order. `current` is sent verbatim, even when empty.
pub fn build_chat_request(history: &[ChatMessage], current: &str) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|msg| Content::user_text(history_turn_text(&msg.text)))
        .collect();
    contents.push(Content::user_text(current));

    GenerateContentRequest {
        contents,
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
        },
    }
}
