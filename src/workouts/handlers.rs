use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::instrument;

use super::dto::{CreateWorkoutProgressRequest, HistoryQuery, WorkoutProgressResponse};
use super::repo;
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn workout_routes() -> Router<AppState> {
    Router::new().route("/workouts/progress", get(my_history).post(create))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateWorkoutProgressRequest>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<WorkoutProgressResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    if payload.title.trim().is_empty() {
        return Err(AppError::validation("Title is required"));
    }

    let recorded_at = payload
        .recorded_at
        .as_deref()
        .and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok())
        .unwrap_or_else(OffsetDateTime::now_utc);

    let item = repo::create(&state.db, user_id, payload.title.trim(), &payload.notes, recorded_at)
        .await
        .map_err(|e| AppError::internal("Failed to record workout", e))?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Workout progress recorded", item.into()),
    ))
}

#[instrument(skip(state))]
pub async fn my_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<HistoryQuery>,
) -> Result<ApiResponse<Vec<WorkoutProgressResponse>>, AppError> {
    let items = repo::list_by_user(&state.db, user_id, q.limit.clamp(1, 200))
        .await
        .map_err(|e| AppError::internal("Failed to get workout history", e))?;
    Ok(ApiResponse::ok(
        "Workout history retrieved",
        items.into_iter().map(WorkoutProgressResponse::from).collect(),
    ))
}
