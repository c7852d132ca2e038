use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use service_core::error::AppError;

use super::users::ensure_user_exists;
use crate::models::{CreateHealthReport, HealthReport};
use crate::startup::AppState;

/// `POST /health-reports`
pub async fn create_health_report(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<CreateHealthReport>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    input
        .check_lengths()
        .map_err(|msg| AppError::BadRequest(anyhow::anyhow!(msg)))?;
    ensure_user_exists(&state, input.user_id).await?;

    let report = state.store.create_health_report(&input).await?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// `GET /health-reports/:id`, where `:id` is the owning user.
pub async fn list_health_reports(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Vec<HealthReport>>, AppError> {
    let reports = state.store.list_health_reports(user_id).await?;

    Ok(Json(reports))
}
