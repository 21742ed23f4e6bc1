use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Standard response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub current_page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl PageMeta {
    pub fn new(current_page: i64, per_page: i64, total_items: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total_items + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            current_page,
            per_page,
            total_pages,
            total_items,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            pagination: None,
            error: None,
        }
    }

    pub fn ok_paginated(message: impl Into<String>, data: T, pagination: PageMeta) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            pagination: Some(pagination),
            error: None,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            pagination: None,
            error: Some(error.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_empty_fields() {
        let resp = ApiResponse::ok("done", serde_json::json!({"id": 1}));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(!json.contains("pagination"));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn error_envelope_carries_both_strings() {
        let resp = ApiResponse::error("Failed to renew membership", "row not found");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("Failed to renew membership"));
        assert!(json.contains("row not found"));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn page_meta_rounds_total_pages_up() {
        let meta = PageMeta::new(1, 10, 25);
        assert_eq!(meta.total_pages, 3);
        let exact = PageMeta::new(1, 10, 30);
        assert_eq!(exact.total_pages, 3);
        let empty = PageMeta::new(1, 10, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
