//! Chat turn persisted per prompt, with the model reply on the same row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Who authored the prompt text of a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    #[default]
    User,
    Ai,
}

impl Sender {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

/// One row of a user's flat conversation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub sender: String,
    /// Client-supplied ISO 8601 timestamp, stored as received.
    pub timestamp: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for persisting a chat row once the model reply is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatMessage {
    pub user_id: i64,
    pub text: String,
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub response: String,
}
