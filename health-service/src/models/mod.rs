//! Domain models for health-service.

mod chat_message;
mod health_report;
mod user;

pub use chat_message::{ChatMessage, CreateChatMessage, Sender};
pub use health_report::{
    CreateHealthReport, HealthReport, MAX_REPORT_DATE_LEN, MAX_REPORT_TYPE_LEN,
};
pub use user::{CreateUser, User};
