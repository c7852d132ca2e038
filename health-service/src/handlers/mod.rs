//! HTTP handlers for health-service.

pub mod health;
pub mod health_reports;
pub mod history;
pub mod users;

pub use health::*;
pub use health_reports::*;
pub use history::*;
pub use users::*;
