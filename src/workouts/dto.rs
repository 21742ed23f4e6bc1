use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::WorkoutProgress;

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutProgressRequest {
    pub title: String,
    #[serde(default)]
    pub notes: String,
    // RFC3339; omitted or unparseable falls back to now
    pub recorded_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    30
}

#[derive(Debug, Serialize)]
pub struct WorkoutProgressResponse {
    pub id: Uuid,
    pub title: String,
    pub notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl From<WorkoutProgress> for WorkoutProgressResponse {
    fn from(w: WorkoutProgress) -> Self {
        Self {
            id: w.id,
            title: w.title,
            notes: w.notes,
            recorded_at: w.recorded_at,
        }
    }
}
