//! Services for health-service.

pub mod chat;
pub mod database;
pub mod memory;
pub mod metrics;
pub mod providers;
pub mod store;

pub use chat::{build_chat_request, GenerateContentRequest};
pub use database::Database;
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use providers::gemini::GeminiProvider;
pub use providers::mock::MockChatProvider;
pub use providers::{ChatProvider, ChatResponse, Completion, CompletionError};
pub use store::HealthStore;
