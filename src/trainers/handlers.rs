use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::repo::{self, Trainer, TrainerSchedule};
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn trainer_routes() -> Router<AppState> {
    Router::new()
        .route("/pt", get(list))
        .route("/pt/:id", get(detail))
        .route("/pt/:id/schedule", get(schedule))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<ApiResponse<Vec<Trainer>>, AppError> {
    let items = repo::list(&state.db)
        .await
        .map_err(|e| AppError::internal("Failed to get trainers", e))?;
    Ok(ApiResponse::ok("Trainers retrieved", items))
}

#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ApiResponse<Trainer>, AppError> {
    let Path(id) = id.map_err(|_| AppError::validation("Invalid trainer ID"))?;
    let trainer = repo::find_by_id(&state.db, id)
        .await
        .map_err(|e| AppError::internal("Failed to get trainer", e))?
        .ok_or_else(|| AppError::not_found("Trainer not found"))?;
    Ok(ApiResponse::ok("Trainer retrieved", trainer))
}

#[instrument(skip(state))]
pub async fn schedule(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ApiResponse<Vec<TrainerSchedule>>, AppError> {
    let Path(id) = id.map_err(|_| AppError::validation("Invalid trainer ID"))?;
    repo::find_by_id(&state.db, id)
        .await
        .map_err(|e| AppError::internal("Failed to get trainer schedule", e))?
        .ok_or_else(|| AppError::not_found("Trainer not found"))?;

    let items = repo::list_schedule(&state.db, id)
        .await
        .map_err(|e| AppError::internal("Failed to get trainer schedule", e))?;
    Ok(ApiResponse::ok("Trainer schedule retrieved", items))
}
