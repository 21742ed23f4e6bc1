use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trainer {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub specialty: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainerSchedule {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
}

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Trainer>> {
    let rows = sqlx::query_as::<_, Trainer>(
        r#"
        SELECT id, name, bio, specialty, photo_url
        FROM trainers
        WHERE deleted_at IS NULL
        ORDER BY name ASC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Trainer>> {
    let row = sqlx::query_as::<_, Trainer>(
        r#"
        SELECT id, name, bio, specialty, photo_url
        FROM trainers
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn list_schedule(db: &PgPool, trainer_id: Uuid) -> anyhow::Result<Vec<TrainerSchedule>> {
    let rows = sqlx::query_as::<_, TrainerSchedule>(
        r#"
        SELECT id, trainer_id, day_of_week, start_time, end_time, location
        FROM trainer_schedules
        WHERE trainer_id = $1 AND deleted_at IS NULL
        ORDER BY day_of_week ASC, start_time ASC
        "#,
    )
    .bind(trainer_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
