use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use service_core::error::AppError;

use crate::models::{CreateUser, User};
use crate::startup::AppState;

/// `POST /user`: signup.
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<CreateUser>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.store.create_user(&input).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /user/:id`
pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<User>, AppError> {
    state
        .store
        .get_user(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User {} not found", user_id)))
}

/// `GET /user/login/:email`: lookup by email, no credential check.
pub async fn get_user_by_email(
    State(state): State<AppState>,
    WithRejection(Path(email), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<User>, AppError> {
    state
        .store
        .get_user_by_email(&email)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User with email '{}' not found", email)))
}

/// Fails with 404 unless `user_id` names an existing user.
pub(crate) async fn ensure_user_exists(state: &AppState, user_id: i64) -> Result<(), AppError> {
    match state.store.get_user(user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(anyhow::anyhow!(
            "User {} not found",
            user_id
        ))),
    }
}
