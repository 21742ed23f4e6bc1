use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Target, TargetProgress};

#[derive(Debug, Deserialize)]
pub struct ListTargetsQuery {
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTargetRequest {
    pub period: String,
    pub title: String,
    pub goal_value: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct TargetResponse {
    pub id: Uuid,
    pub period: String,
    pub title: String,
    pub goal_value: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
}

impl From<Target> for TargetResponse {
    fn from(t: Target) -> Self {
        Self {
            id: t.id,
            period: t.period,
            title: t.title,
            goal_value: t.goal_value,
            start_date: t.start_date,
            end_date: t.end_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddTargetProgressRequest {
    pub value: i32,
    // RFC3339; omitted or unparseable falls back to now
    pub recorded_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressHistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    30
}

#[derive(Debug, Serialize)]
pub struct TargetProgressResponse {
    pub id: Uuid,
    pub value: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl From<TargetProgress> for TargetProgressResponse {
    fn from(p: TargetProgress) -> Self {
        Self {
            id: p.id,
            value: p.value,
            recorded_at: p.recorded_at,
        }
    }
}
