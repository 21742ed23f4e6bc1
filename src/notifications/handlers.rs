use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::repo::{self, Notification};
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            title: n.title,
            body: n.body,
            kind: n.kind,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    30
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(my_list))
        .route("/notifications/:id", get(detail))
        .route("/notifications/:id/read", put(mark_read))
}

#[instrument(skip(state))]
pub async fn my_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<ApiResponse<Vec<NotificationResponse>>, AppError> {
    let items = repo::list_by_user(&state.db, user_id, q.limit.clamp(1, 200))
        .await
        .map_err(|e| AppError::internal("Failed to get notifications", e))?;
    Ok(ApiResponse::ok(
        "Notifications retrieved",
        items.into_iter().map(NotificationResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ApiResponse<NotificationResponse>, AppError> {
    let Path(id) = id.map_err(|_| AppError::validation("Invalid notification ID"))?;
    let item = repo::find_by_id_for_user(&state.db, id, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to get notification", e))?
        .ok_or_else(|| AppError::not_found("Notification not found"))?;
    Ok(ApiResponse::ok("Notification retrieved", item.into()))
}

#[instrument(skip(state))]
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let Path(id) = id.map_err(|_| AppError::validation("Invalid notification ID"))?;
    let updated = repo::mark_read(&state.db, id, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to mark notification read", e))?;
    if !updated {
        return Err(AppError::not_found("Notification not found"));
    }
    Ok(ApiResponse::ok("Notification marked as read", serde_json::json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_type() {
        let resp = NotificationResponse {
            id: Uuid::new_v4(),
            title: "Membership expiring".into(),
            body: "Renew before Friday".into(),
            kind: "membership".into(),
            is_read: false,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""type":"membership""#));
        assert!(!json.contains("kind"));
    }
}
