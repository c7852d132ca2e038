//! Dated free-text health log owned by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub id: i64,
    pub user_id: i64,
    /// Free-form tag such as "Daily Log" or "Symptom Update".
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub report_type: String,
    pub description: String,
    /// Day the report refers to, `YYYY-MM-DD` by convention.
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Column width of `health_reports.type`.
pub const MAX_REPORT_TYPE_LEN: usize = 100;

/// Column width of `health_reports.date`.
pub const MAX_REPORT_DATE_LEN: usize = 10;

/// Input for creating a health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHealthReport {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub report_type: String,
    pub description: String,
    pub date: String,
}

impl CreateHealthReport {
    /// Check field widths against the schema. Lengths are in characters.
    pub fn check_lengths(&self) -> Result<(), String> {
        if self.report_type.chars().count() > MAX_REPORT_TYPE_LEN {
            return Err(format!(
                "type must be at most {} characters",
                MAX_REPORT_TYPE_LEN
            ));
        }
        if self.date.chars().count() > MAX_REPORT_DATE_LEN {
            return Err(format!(
                "date must be at most {} characters",
                MAX_REPORT_DATE_LEN
            ));
        }
        Ok(())
    }
}
