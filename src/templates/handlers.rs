use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::repo::{self, Template};
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<Template> for TemplateResponse {
    fn from(t: Template) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FollowTemplateRequest {
    pub template_id: Uuid,
}

pub fn template_routes() -> Router<AppState> {
    Router::new()
        .route("/templates/followed", get(my_followed))
        .route("/templates/follow", post(follow))
        .route("/templates/:id", get(detail))
}

#[instrument(skip(state))]
pub async fn my_followed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<Vec<TemplateResponse>>, AppError> {
    let items = repo::list_followed_by_user(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to get templates", e))?;
    Ok(ApiResponse::ok(
        "Followed templates retrieved",
        items.into_iter().map(TemplateResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ApiResponse<TemplateResponse>, AppError> {
    let Path(id) = id.map_err(|_| AppError::validation("Invalid template ID"))?;
    let template = repo::find_by_id(&state.db, id)
        .await
        .map_err(|e| AppError::internal("Failed to get template", e))?
        .ok_or_else(|| AppError::not_found("Template not found"))?;
    Ok(ApiResponse::ok("Template retrieved", template.into()))
}

#[instrument(skip(state, payload))]
pub async fn follow(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<FollowTemplateRequest>, JsonRejection>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    repo::find_by_id(&state.db, payload.template_id)
        .await
        .map_err(|e| AppError::internal("Failed to follow template", e))?
        .ok_or_else(|| AppError::not_found("Template not found"))?;

    repo::follow(&state.db, user_id, payload.template_id, OffsetDateTime::now_utc())
        .await
        .map_err(|e| AppError::internal("Failed to follow template", e))?;
    Ok(ApiResponse::ok("Template followed", serde_json::json!({})))
}
