use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{LoginRequest, LoginResponse};
use super::tokens::TokenKeys;
use crate::auth::password::verify_password;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::users::repo::User;

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<LoginResponse>, AppError> {
    let Json(mut payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password are indistinguishable to the caller.
    let user = User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(|e| AppError::internal("Failed to log in", e))?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            AppError::unauthorized("invalid credentials")
        })?;

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal("Failed to log in", e))?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized("invalid credentials"));
    }

    let keys = TokenKeys::from_ref(&state);
    let access_token = keys
        .sign_access(user.id)
        .map_err(|e| AppError::internal("Failed to log in", e))?;
    let expires_in = keys.access_ttl.as_secs() as i64;

    info!(user_id = %user.id, "user logged in");
    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            access_token,
            token_type: "Bearer".into(),
            expires_in,
            user: user.into(),
        },
    ))
}
