//! Application startup and lifecycle management.

use crate::config::HealthConfig;
use crate::handlers;
use crate::services::{
    init_metrics, ChatProvider, Database, GeminiProvider, HealthStore, InMemoryStore,
    MockChatProvider,
};
use axum::{
    body::Body,
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::tracing::{make_request_span, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: HealthConfig,
    pub store: Arc<dyn HealthStore>,
    pub chat: Arc<dyn ChatProvider>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application, choosing storage and chat backends from `config`.
    pub async fn build(config: HealthConfig) -> Result<Self, AppError> {
        init_metrics();

        let store: Arc<dyn HealthStore> = match &config.database {
            Some(db_config) => {
                let db = Database::new(
                    &db_config.url,
                    db_config.max_connections,
                    db_config.min_connections,
                )
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to connect to PostgreSQL");
                    e
                })?;

                db.run_migrations().await.map_err(|e| {
                    tracing::error!(error = %e, "Failed to run migrations");
                    e
                })?;

                Arc::new(db)
            }
            None => {
                tracing::warn!("DATABASE_URL not set - using in-memory store");
                Arc::new(InMemoryStore::new())
            }
        };

        let chat: Arc<dyn ChatProvider> = if config.gemini.api_key.is_some() {
            let provider = GeminiProvider::new(config.gemini.clone()).map_err(|e| {
                tracing::error!(error = %e, "Failed to create Gemini client");
                AppError::InternalError(anyhow::anyhow!("Failed to create Gemini client: {}", e))
            })?;
            Arc::new(provider)
        } else {
            tracing::warn!("GEMINI_API_KEY not set - using mock chat provider");
            Arc::new(MockChatProvider::new())
        };

        Self::build_with(config, store, chat).await
    }

    /// Build the application around already constructed backends.
    pub async fn build_with(
        config: HealthConfig,
        store: Arc<dyn HealthStore>,
        chat: Arc<dyn ChatProvider>,
    ) -> Result<Self, AppError> {
        let addr = config.common.address();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = listener.local_addr()?.port();

        tracing::info!(
            http_port = http_port,
            chat_provider = chat.name(),
            "Health service listener bound"
        );

        Ok(Self {
            http_port,
            listener,
            state: AppState {
                config,
                store,
                chat,
            },
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = router(self.state);

        axum::serve(self.listener, router).await
    }
}

/// All HTTP routes with CORS, tracing and request-id layers.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/user", post(handlers::create_user))
        .route("/user/:id", get(handlers::get_user))
        .route("/user/login/:email", get(handlers::get_user_by_email))
        .route("/health-reports", post(handlers::create_health_report))
        .route("/health-reports/:id", get(handlers::list_health_reports))
        .route("/history", post(handlers::submit_chat_message))
        .route("/history/:user_id", get(handlers::list_chat_history))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}
