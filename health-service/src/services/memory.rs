//! In-process store used when no database is configured.
//!
//! Mirrors the Postgres schema: auto-incrementing ids per table, unique
//! `users.email`, auto timestamps and soft-delete filtering.

use crate::models::{
    ChatMessage, CreateChatMessage, CreateHealthReport, CreateUser, HealthReport, User,
};
use crate::services::store::HealthStore;
use async_trait::async_trait;
use chrono::Utc;
use service_core::error::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    health_reports: Vec<HealthReport>,
    chat_messages: Vec<ChatMessage>,
}

impl Tables {
    fn next_id<T>(rows: &[T], id: impl Fn(&T) -> i64) -> i64 {
        rows.iter().map(id).max().unwrap_or(0) + 1
    }
}

/// Thread-safe store backed by vectors behind a single lock.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn create_user(&self, input: &CreateUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .iter()
            .any(|u| u.deleted_at.is_none() && u.email == input.email)
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "User with email '{}' already exists",
                input.email
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Tables::next_id(&tables.users, |u| u.id),
            name: input.name.clone(),
            email: input.email.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.users.push(user.clone());

        info!(user_id = user.id, "User created");

        Ok(user)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == user_id && u.deleted_at.is_none())
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    #[instrument(skip(self, input), fields(user_id = input.user_id))]
    async fn create_health_report(
        &self,
        input: &CreateHealthReport,
    ) -> Result<HealthReport, AppError> {
        let mut tables = self.tables.write().await;

        let now = Utc::now();
        let report = HealthReport {
            id: Tables::next_id(&tables.health_reports, |r| r.id),
            user_id: input.user_id,
            report_type: input.report_type.clone(),
            description: input.description.clone(),
            date: input.date.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.health_reports.push(report.clone());

        info!(report_id = report.id, "Health report created");

        Ok(report)
    }

    async fn list_health_reports(&self, user_id: i64) -> Result<Vec<HealthReport>, AppError> {
        let tables = self.tables.read().await;
        let mut reports: Vec<HealthReport> = tables
            .health_reports
            .iter()
            .filter(|r| r.user_id == user_id && r.deleted_at.is_none())
            .cloned()
            .collect();

        reports.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        Ok(reports)
    }

    #[instrument(skip(self, input), fields(user_id = input.user_id))]
    async fn create_chat_message(
        &self,
        input: &CreateChatMessage,
    ) -> Result<ChatMessage, AppError> {
        let mut tables = self.tables.write().await;

        let now = Utc::now();
        let message = ChatMessage {
            id: Tables::next_id(&tables.chat_messages, |m| m.id),
            user_id: input.user_id,
            text: input.text.clone(),
            sender: input.sender.as_str().to_string(),
            timestamp: input.timestamp.clone(),
            response: input.response.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.chat_messages.push(message.clone());

        info!(message_id = message.id, "Chat message stored");

        Ok(message)
    }

    async fn list_chat_messages(&self, user_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .chat_messages
            .iter()
            .filter(|m| m.user_id == user_id && m.deleted_at.is_none())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            name: "Jane".to_string(),
            email: email.to_string(),
        }
    }

    fn new_report(user_id: i64, description: &str) -> CreateHealthReport {
        CreateHealthReport {
            user_id,
            report_type: "Daily Log".to_string(),
            description: description.to_string(),
            date: "2025-01-10".to_string(),
        }
    }

    fn new_message(user_id: i64, text: &str) -> CreateChatMessage {
        CreateChatMessage {
            user_id,
            text: text.to_string(),
            sender: Sender::User,
            timestamp: "2025-01-10T10:00:00Z".to_string(),
            response: format!("reply to {}", text),
        }
    }

    #[tokio::test]
    async fn user_ids_increment_and_lookup_works() {
        let store = InMemoryStore::new();

        let first = store.create_user(&new_user("a@x.io")).await.unwrap();
        let second = store.create_user(&new_user("b@x.io")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.get_user(2).await.unwrap().unwrap().email, "b@x.io");
        assert_eq!(
            store.get_user_by_email("a@x.io").await.unwrap().unwrap().id,
            1
        );
        assert!(store.get_user(99).await.unwrap().is_none());
        assert!(store.get_user_by_email("nobody@x.io").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = InMemoryStore::new();
        store.create_user(&new_user("jane@x.io")).await.unwrap();

        let err = store.create_user(&new_user("jane@x.io")).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn reports_are_listed_newest_first_per_user() {
        let store = InMemoryStore::new();
        store.create_health_report(&new_report(1, "first")).await.unwrap();
        store.create_health_report(&new_report(2, "other user")).await.unwrap();
        store.create_health_report(&new_report(1, "second")).await.unwrap();

        let reports = store.list_health_reports(1).await.unwrap();

        let descriptions: Vec<&str> = reports.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn chat_messages_keep_insertion_order() {
        let store = InMemoryStore::new();
        for text in ["A", "B", "C"] {
            store.create_chat_message(&new_message(7, text)).await.unwrap();
        }
        store.create_chat_message(&new_message(8, "elsewhere")).await.unwrap();

        let messages = store.list_chat_messages(7).await.unwrap();

        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
        assert_eq!(messages[0].response, "reply to A");
        assert_eq!(messages[0].sender, "user");
    }

    #[tokio::test]
    async fn concurrent_signups_get_distinct_ids() {
        let store = InMemoryStore::new();

        let users = futures::future::join_all((0..10).map(|n| {
            let store = store.clone();
            async move { store.create_user(&new_user(&format!("u{}@x.io", n))).await }
        }))
        .await;

        let mut ids: Vec<i64> = users.into_iter().map(|u| u.unwrap().id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn unknown_user_has_empty_collections() {
        let store = InMemoryStore::new();

        assert!(store.list_health_reports(42).await.unwrap().is_empty());
        assert!(store.list_chat_messages(42).await.unwrap().is_empty());
    }
}
