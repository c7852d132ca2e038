//! Database service for health-service.

use crate::models::{
    ChatMessage, CreateChatMessage, CreateHealthReport, CreateUser, HealthReport, User,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::HealthStore;
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at, deleted_at";
const HEALTH_REPORT_COLUMNS: &str =
    "id, user_id, type, description, date, created_at, updated_at, deleted_at";
const CHAT_MESSAGE_COLUMNS: &str =
    "id, user_id, text, sender, timestamp, response, created_at, updated_at, deleted_at";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "health-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl HealthStore for Database {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // User Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn create_user(&self, input: &CreateUser) -> Result<User, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_user"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "User with email '{}' already exists",
                    input.email
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create user: {}", e)),
        })?;

        timer.observe_duration();

        info!(user_id = user.id, "User created");

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_user"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get user: {}", e)))?;

        timer.observe_duration();

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_user_by_email"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get user by email: {}", e))
        })?;

        timer.observe_duration();

        Ok(user)
    }

    // -------------------------------------------------------------------------
    // Health Report Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(user_id = input.user_id))]
    async fn create_health_report(
        &self,
        input: &CreateHealthReport,
    ) -> Result<HealthReport, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_health_report"])
            .start_timer();

        let report = sqlx::query_as::<_, HealthReport>(&format!(
            r#"
            INSERT INTO health_reports (user_id, type, description, date)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            HEALTH_REPORT_COLUMNS
        ))
        .bind(input.user_id)
        .bind(&input.report_type)
        .bind(&input.description)
        .bind(&input.date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create health report: {}", e))
        })?;

        timer.observe_duration();

        info!(report_id = report.id, "Health report created");

        Ok(report)
    }

    #[instrument(skip(self))]
    async fn list_health_reports(&self, user_id: i64) -> Result<Vec<HealthReport>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_health_reports"])
            .start_timer();

        let reports = sqlx::query_as::<_, HealthReport>(&format!(
            r#"
            SELECT {}
            FROM health_reports
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY updated_at DESC, id DESC
            "#,
            HEALTH_REPORT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list health reports: {}", e))
        })?;

        timer.observe_duration();

        Ok(reports)
    }

    // -------------------------------------------------------------------------
    // Chat Message Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(user_id = input.user_id))]
    async fn create_chat_message(
        &self,
        input: &CreateChatMessage,
    ) -> Result<ChatMessage, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_chat_message"])
            .start_timer();

        let message = sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            INSERT INTO chat_messages (user_id, text, sender, timestamp, response)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CHAT_MESSAGE_COLUMNS
        ))
        .bind(input.user_id)
        .bind(&input.text)
        .bind(input.sender.as_str())
        .bind(&input.timestamp)
        .bind(&input.response)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create chat message: {}", e))
        })?;

        timer.observe_duration();

        info!(message_id = message.id, "Chat message stored");

        Ok(message)
    }

    #[instrument(skip(self))]
    async fn list_chat_messages(&self, user_id: i64) -> Result<Vec<ChatMessage>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_chat_messages"])
            .start_timer();

        let messages = sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            SELECT {}
            FROM chat_messages
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY id ASC
            "#,
            CHAT_MESSAGE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list chat messages: {}", e))
        })?;

        timer.observe_duration();

        Ok(messages)
    }
}
