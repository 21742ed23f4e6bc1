use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub notes: String,
    pub recorded_at: OffsetDateTime,
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    title: &str,
    notes: &str,
    recorded_at: OffsetDateTime,
) -> anyhow::Result<WorkoutProgress> {
    let row = sqlx::query_as::<_, WorkoutProgress>(
        r#"
        INSERT INTO workout_progress (user_id, title, notes, recorded_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, title, notes, recorded_at
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(notes)
    .bind(recorded_at)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> anyhow::Result<Vec<WorkoutProgress>> {
    let rows = sqlx::query_as::<_, WorkoutProgress>(
        r#"
        SELECT id, user_id, title, notes, recorded_at
        FROM workout_progress
        WHERE user_id = $1 AND deleted_at IS NULL
        ORDER BY recorded_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
