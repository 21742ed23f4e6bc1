use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct MembershipStatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<OffsetDateTime>,
}

impl MembershipStatusResponse {
    pub fn expired() -> Self {
        Self {
            status: super::repo::STATUS_EXPIRED.into(),
            plan: None,
            starts_at: None,
            ends_at: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MembershipHistoryItem {
    pub status: String,
    pub plan: String,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub current: MembershipStatusResponse,
    pub history: Vec<MembershipHistoryItem>,
}

#[derive(Debug, Deserialize)]
pub struct RenewMembershipRequest {
    #[serde(default)]
    pub months: i32,
    #[serde(default)]
    pub plan: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_current_serializes_status_only() {
        let current = MembershipStatusResponse::expired();
        let json = serde_json::to_string(&current).unwrap();
        assert_eq!(json, r#"{"status":"expired"}"#);
    }

    #[test]
    fn renew_request_defaults_to_zero_values() {
        let req: RenewMembershipRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.months, 0);
        assert_eq!(req.plan, "");
    }
}
