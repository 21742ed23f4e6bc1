use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    AddTargetProgressRequest, CreateTargetRequest, ListTargetsQuery, ProgressHistoryQuery,
    TargetProgressResponse, TargetResponse,
};
use super::repo;
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn target_routes() -> Router<AppState> {
    Router::new()
        .route("/targets", get(my_targets).post(create_target))
        .route("/targets/:id/progress", get(progress_history).post(add_progress))
}

/// Parse an optional RFC3339 timestamp, falling back to now on anything else.
fn recorded_at_or_now(raw: Option<&str>) -> OffsetDateTime {
    raw.and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

/// Load a target and hide other users' rows behind a 404.
async fn owned_target(
    state: &AppState,
    user_id: Uuid,
    target_id: Uuid,
) -> Result<repo::Target, AppError> {
    let target = repo::find_by_id(&state.db, target_id)
        .await
        .map_err(|e| AppError::internal("Failed to get target", e))?
        .ok_or_else(|| AppError::not_found("Target not found"))?;
    if target.user_id != user_id {
        return Err(AppError::not_found("Target not found"));
    }
    Ok(target)
}

#[instrument(skip(state))]
pub async fn my_targets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListTargetsQuery>,
) -> Result<ApiResponse<Vec<TargetResponse>>, AppError> {
    let period = q.period.as_deref().filter(|p| !p.is_empty());
    let items = repo::list_by_user(&state.db, user_id, period)
        .await
        .map_err(|e| AppError::internal("Failed to get targets", e))?;
    Ok(ApiResponse::ok(
        "Targets retrieved",
        items.into_iter().map(TargetResponse::from).collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_target(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateTargetRequest>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<TargetResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    if payload.period != "weekly" && payload.period != "monthly" {
        return Err(AppError::validation("Period must be weekly or monthly"));
    }
    if payload.title.trim().is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if payload.end_date <= payload.start_date {
        return Err(AppError::validation("End date must be after start date"));
    }

    let target = repo::create(
        &state.db,
        user_id,
        &payload.period,
        payload.title.trim(),
        payload.goal_value,
        payload.start_date,
        payload.end_date,
    )
    .await
    .map_err(|e| AppError::internal("Failed to create target", e))?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Target created", target.into()),
    ))
}

#[instrument(skip(state, payload))]
pub async fn add_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddTargetProgressRequest>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<TargetProgressResponse>), AppError> {
    let Path(target_id) = id.map_err(|_| AppError::validation("Invalid target ID"))?;
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    let target = owned_target(&state, user_id, target_id).await?;

    let recorded_at = recorded_at_or_now(payload.recorded_at.as_deref());
    let progress = repo::create_progress(&state.db, target.id, payload.value, recorded_at)
        .await
        .map_err(|e| AppError::internal("Failed to add progress", e))?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Progress added", progress.into()),
    ))
}

#[instrument(skip(state))]
pub async fn progress_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    Query(q): Query<ProgressHistoryQuery>,
) -> Result<ApiResponse<Vec<TargetProgressResponse>>, AppError> {
    let Path(target_id) = id.map_err(|_| AppError::validation("Invalid target ID"))?;
    let target = owned_target(&state, user_id, target_id).await?;

    let items = repo::list_progress(&state.db, target.id, q.limit.clamp(1, 200))
        .await
        .map_err(|e| AppError::internal("Failed to get progress history", e))?;
    Ok(ApiResponse::ok(
        "Progress history retrieved",
        items.into_iter().map(TargetProgressResponse::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_at_falls_back_to_now_on_garbage() {
        let before = OffsetDateTime::now_utc();
        let parsed = recorded_at_or_now(Some("not-a-timestamp"));
        assert!(parsed >= before);

        let parsed = recorded_at_or_now(None);
        assert!(parsed >= before);
    }

    #[test]
    fn recorded_at_accepts_rfc3339() {
        let parsed = recorded_at_or_now(Some("2025-06-01T08:30:00Z"));
        assert_eq!(parsed.year(), 2025);
        assert_eq!(parsed.hour(), 8);
    }
}
