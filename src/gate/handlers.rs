use axum::{
    extract::{rejection::JsonRejection, FromRef, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::dto::{AttendanceLogResponse, MyQrCodeResponse, ScanRequest, ScanResponse};
use super::service;
use crate::auth::extractors::AuthUser;
use crate::auth::tokens::TokenKeys;
use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    30
}

/// Gate-device facing scan endpoint; no bearer auth, the QR token is the
/// credential.
pub fn scan_routes() -> Router<AppState> {
    Router::new().route("/qr/scan", post(scan))
}

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/qr/code", get(my_qr_code))
        .route("/attendance/history", get(my_history))
}

#[instrument(skip(state))]
pub async fn my_qr_code(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<MyQrCodeResponse>, AppError> {
    let keys = TokenKeys::from_ref(&state);
    let resp = service::my_qr_code(state.memberships.as_ref(), &keys, user_id)
        .await
        .map_err(|e| AppError::internal("Failed to get QR", e))?;
    Ok(ApiResponse::ok("QR generated successfully", resp))
}

#[instrument(skip(state, payload))]
pub async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<ApiResponse<ScanResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let keys = TokenKeys::from_ref(&state);
    let resp = service::scan(
        state.memberships.as_ref(),
        state.attendance.as_ref(),
        &keys,
        &payload.token,
    )
    .await
    .map_err(|e| AppError::internal("Failed to scan QR", e))?;
    Ok(ApiResponse::ok("Scan processed", resp))
}

#[instrument(skip(state))]
pub async fn my_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<HistoryQuery>,
) -> Result<ApiResponse<Vec<AttendanceLogResponse>>, AppError> {
    let resp = service::my_history(state.attendance.as_ref(), user_id, q.limit.clamp(1, 200))
        .await
        .map_err(|e| AppError::internal("Failed to get attendance history", e))?;
    Ok(ApiResponse::ok("Attendance history retrieved", resp))
}
