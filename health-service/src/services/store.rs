//! Storage interface consumed by the HTTP layer.
//!
//! Implementations enforce the field-level invariants of the schema:
//! `users.email` is unique, every row carries auto timestamps, and rows with a
//! soft-delete marker are never returned. `user_id` references are checked by
//! callers, not by the store.

use crate::models::{
    ChatMessage, CreateChatMessage, CreateHealthReport, CreateUser, HealthReport, User,
};
use async_trait::async_trait;
use service_core::error::AppError;

#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Check storage connectivity.
    async fn health_check(&self) -> Result<(), AppError>;

    /// Create a user. Fails with `AppError::Conflict` when the email is taken.
    async fn create_user(&self, input: &CreateUser) -> Result<User, AppError>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn create_health_report(
        &self,
        input: &CreateHealthReport,
    ) -> Result<HealthReport, AppError>;

    /// Reports of one user, most recently updated first.
    async fn list_health_reports(&self, user_id: i64) -> Result<Vec<HealthReport>, AppError>;

    async fn create_chat_message(&self, input: &CreateChatMessage)
        -> Result<ChatMessage, AppError>;

    /// Chat rows of one user in insertion order.
    async fn list_chat_messages(&self, user_id: i64) -> Result<Vec<ChatMessage>, AppError>;
}
