use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use service_core::error::AppError;

use super::users::ensure_user_exists;
use crate::models::{ChatMessage, CreateChatMessage, Sender};
use crate::services::metrics::ERRORS_TOTAL;
use crate::services::{build_chat_request, ChatResponse};
use crate::startup::AppState;

/// Body of `POST /history`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitChatMessage {
    pub user_id: i64,
    pub text: String,
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub timestamp: String,
}

/// `POST /history`: ask the model, then store the prompt with its reply.
///
/// Upstream failures do not change the status code; they are reported inside
/// the [`ChatResponse`] and the row is stored with an empty reply.
pub async fn submit_chat_message(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<SubmitChatMessage>, AppError>,
) -> Result<Json<ChatResponse>, AppError> {
    ensure_user_exists(&state, input.user_id).await?;

    let history = state.store.list_chat_messages(input.user_id).await?;
    let request = build_chat_request(&history, &input.text);

    tracing::info!(
        user_id = input.user_id,
        prior_turns = history.len(),
        provider = state.chat.name(),
        "Requesting chat completion"
    );

    let response = ChatResponse::from(state.chat.complete(&request).await);
    if response.error.is_some() {
        ERRORS_TOTAL.with_label_values(&["chat_completion"]).inc();
    }

    state
        .store
        .create_chat_message(&CreateChatMessage {
            user_id: input.user_id,
            text: input.text,
            sender: input.sender,
            timestamp: input.timestamp,
            response: response.ai_message.clone(),
        })
        .await?;

    Ok(Json(response))
}

/// `GET /history/:user_id`
pub async fn list_chat_history(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let messages = state.store.list_chat_messages(user_id).await?;

    Ok(Json(messages))
}
