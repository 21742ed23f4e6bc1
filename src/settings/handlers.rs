use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::repo::{self, UserSetting};
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub push_enabled: bool,
    pub email_enabled: bool,
    pub language: String,
}

impl From<UserSetting> for SettingsResponse {
    fn from(s: UserSetting) -> Self {
        Self {
            push_enabled: s.push_enabled,
            email_enabled: s.email_enabled,
            language: s.language,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub push_enabled: Option<bool>,
    pub email_enabled: Option<bool>,
    pub language: Option<String>,
}

pub fn setting_routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<SettingsResponse>, AppError> {
    let setting = repo::get_or_create(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to get settings", e))?;
    Ok(ApiResponse::ok("Settings retrieved", setting.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> Result<ApiResponse<SettingsResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    let mut setting = repo::get_or_create(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to update settings", e))?;

    if let Some(push) = payload.push_enabled {
        setting.push_enabled = push;
    }
    if let Some(email) = payload.email_enabled {
        setting.email_enabled = email;
    }
    if let Some(language) = payload.language {
        if !language.is_empty() {
            setting.language = language;
        }
    }

    repo::update(&state.db, &setting)
        .await
        .map_err(|e| AppError::internal("Failed to update settings", e))?;
    Ok(ApiResponse::ok("Settings updated", setting.into()))
}
