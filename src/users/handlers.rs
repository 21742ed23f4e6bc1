use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    ChangePasswordRequest, CreateUserRequest, ListUsersQuery, UpdateUserRequest, UserResponse,
};
use super::repo::User;
use crate::auth::extractors::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::response::{ApiResponse, PageMeta};
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/users/:id/password", put(change_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<UserResponse>), AppError> {
    let Json(mut payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation("Password too short"));
    }

    if let Ok(Some(_)) = User::find_by_email(&state.db, &payload.email).await {
        return Err(AppError::validation("Email already registered"));
    }

    let hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal("Failed to create user", e))?;

    let user = User::create(
        &state.db,
        &payload.name,
        &payload.email,
        payload.phone.as_deref(),
        payload.address.as_deref(),
        &hash,
    )
    .await
    .map_err(|e| AppError::internal("Failed to create user", e))?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("User created successfully", user.into()),
    ))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(q): Query<ListUsersQuery>,
) -> Result<ApiResponse<Vec<UserResponse>>, AppError> {
    let page = q.page.max(1);
    let per_page = q.per_page.clamp(1, 100);

    let (users, total) = User::find_all(&state.db, page, per_page)
        .await
        .map_err(|e| AppError::internal("Failed to get users", e))?;

    let items = users.into_iter().map(UserResponse::from).collect();
    Ok(ApiResponse::ok_paginated(
        "Users retrieved successfully",
        items,
        PageMeta::new(page, per_page, total),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let Path(id) = id.map_err(|_| AppError::validation("Invalid user ID"))?;
    let user = User::find_by_id(&state.db, id)
        .await
        .map_err(|e| AppError::internal("Failed to get user", e))?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ApiResponse::ok("User retrieved successfully", user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let Path(id) = id.map_err(|_| AppError::validation("Invalid user ID"))?;
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    let mut user = User::find_by_id(&state.db, id)
        .await
        .map_err(|e| AppError::internal("Failed to get user", e))?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::validation("Invalid email"));
        }
        if let Ok(Some(existing)) = User::find_by_email(&state.db, &email).await {
            if existing.id != id {
                return Err(AppError::validation("Email already used by another user"));
            }
        }
        user.email = email;
    }
    if let Some(phone) = payload.phone {
        user.phone = Some(phone);
    }
    if let Some(address) = payload.address {
        user.address = Some(address);
    }
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
    }

    user.update(&state.db)
        .await
        .map_err(|e| AppError::internal("Failed to update user", e))?;

    Ok(ApiResponse::ok("User updated successfully", user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let Path(id) = id.map_err(|_| AppError::validation("Invalid user ID"))?;
    let deleted = User::soft_delete(&state.db, id)
        .await
        .map_err(|e| AppError::internal("Failed to delete user", e))?;
    if !deleted {
        return Err(AppError::not_found("User not found"));
    }
    info!(user_id = %id, "user deleted");
    Ok(ApiResponse::ok("User deleted successfully", serde_json::json!({})))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let Path(id) = id.map_err(|_| AppError::validation("Invalid user ID"))?;
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    if payload.new_password.len() < 6 {
        return Err(AppError::validation("Password too short"));
    }

    let mut user = User::find_by_id(&state.db, id)
        .await
        .map_err(|e| AppError::internal("Failed to get user", e))?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let ok = verify_password(&payload.old_password, &user.password_hash)
        .map_err(|e| AppError::internal("Failed to change password", e))?;
    if !ok {
        return Err(AppError::validation("Old password is incorrect"));
    }

    user.password_hash = hash_password(&payload.new_password)
        .map_err(|e| AppError::internal("Failed to change password", e))?;
    user.update(&state.db)
        .await
        .map_err(|e| AppError::internal("Failed to change password", e))?;

    info!(user_id = %id, "password changed");
    Ok(ApiResponse::ok("Password changed successfully", serde_json::json!({})))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to get profile", e))?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ApiResponse::ok("Profile retrieved successfully", user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("member@example.com"));
        assert!(is_valid_email("a.b+c@gym.co.id"));
    }

    #[test]
    fn email_regex_rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }
}
