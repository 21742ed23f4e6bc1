use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MyQrCodeResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub membership_status: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub token: String,
}

/// Scan outcome. Rejections are part of the contract, not HTTP errors: the
/// gate device must tell a valid rejection apart from a transport failure.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<OffsetDateTime>,
}

impl ScanResponse {
    pub fn rejected(reason: &str) -> Self {
        Self {
            accepted: false,
            reason: Some(reason.into()),
            direction: None,
            occurred_at: None,
        }
    }

    pub fn accepted(direction: String, occurred_at: OffsetDateTime) -> Self {
        Self {
            accepted: true,
            reason: None,
            direction: Some(direction),
            occurred_at: Some(occurred_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceLogResponse {
    pub id: Uuid,
    pub direction: String,
    pub source: String,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_omits_direction_and_timestamp() {
        let json = serde_json::to_string(&ScanResponse::rejected("invalid_qr")).unwrap();
        assert_eq!(json, r#"{"accepted":false,"reason":"invalid_qr"}"#);
    }

    #[test]
    fn acceptance_omits_reason() {
        let resp = ScanResponse::accepted("in".into(), OffsetDateTime::now_utc());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""accepted":true"#));
        assert!(json.contains(r#""direction":"in""#));
        assert!(!json.contains("reason"));
    }
}
