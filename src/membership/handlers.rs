use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{MembershipResponse, RenewMembershipRequest};
use super::service;
use crate::auth::extractors::AuthUser;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn membership_routes() -> Router<AppState> {
    Router::new()
        .route("/membership", get(my_membership))
        .route("/membership/renew", post(renew))
}

#[instrument(skip(state))]
pub async fn my_membership(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<MembershipResponse>, AppError> {
    let resp = service::my_membership(state.memberships.as_ref(), user_id)
        .await
        .map_err(|e| AppError::internal("Failed to get membership", e))?;
    Ok(ApiResponse::ok("Membership retrieved successfully", resp))
}

#[instrument(skip(state, payload))]
pub async fn renew(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<RenewMembershipRequest>, JsonRejection>,
) -> Result<ApiResponse<MembershipResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let resp = service::renew(state.memberships.as_ref(), user_id, payload.months, &payload.plan)
        .await
        .map_err(|e| AppError::internal("Failed to renew membership", e))?;
    Ok(ApiResponse::ok("Membership renewed successfully", resp))
}
