use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Target {
    pub id: Uuid,
    pub user_id: Uuid,
    pub period: String,
    pub title: String,
    pub goal_value: i32,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TargetProgress {
    pub id: Uuid,
    pub target_id: Uuid,
    pub value: i32,
    pub recorded_at: OffsetDateTime,
}

const TARGET_COLUMNS: &str =
    "id, user_id, period, title, goal_value, start_date, end_date, created_at, updated_at";

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    period: Option<&str>,
) -> anyhow::Result<Vec<Target>> {
    let rows = match period {
        Some(period) => {
            sqlx::query_as::<_, Target>(&format!(
                r#"
                SELECT {TARGET_COLUMNS}
                FROM targets
                WHERE user_id = $1 AND period = $2 AND deleted_at IS NULL
                ORDER BY start_date DESC
                "#,
            ))
            .bind(user_id)
            .bind(period)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Target>(&format!(
                r#"
                SELECT {TARGET_COLUMNS}
                FROM targets
                WHERE user_id = $1 AND deleted_at IS NULL
                ORDER BY start_date DESC
                "#,
            ))
            .bind(user_id)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Target>> {
    let row = sqlx::query_as::<_, Target>(&format!(
        r#"SELECT {TARGET_COLUMNS} FROM targets WHERE id = $1 AND deleted_at IS NULL"#,
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    period: &str,
    title: &str,
    goal_value: i32,
    start_date: OffsetDateTime,
    end_date: OffsetDateTime,
) -> anyhow::Result<Target> {
    let row = sqlx::query_as::<_, Target>(&format!(
        r#"
        INSERT INTO targets (user_id, period, title, goal_value, start_date, end_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {TARGET_COLUMNS}
        "#,
    ))
    .bind(user_id)
    .bind(period)
    .bind(title)
    .bind(goal_value)
    .bind(start_date)
    .bind(end_date)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn create_progress(
    db: &PgPool,
    target_id: Uuid,
    value: i32,
    recorded_at: OffsetDateTime,
) -> anyhow::Result<TargetProgress> {
    let row = sqlx::query_as::<_, TargetProgress>(
        r#"
        INSERT INTO target_progress (target_id, value, recorded_at)
        VALUES ($1, $2, $3)
        RETURNING id, target_id, value, recorded_at
        "#,
    )
    .bind(target_id)
    .bind(value)
    .bind(recorded_at)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_progress(
    db: &PgPool,
    target_id: Uuid,
    limit: i64,
) -> anyhow::Result<Vec<TargetProgress>> {
    let rows = sqlx::query_as::<_, TargetProgress>(
        r#"
        SELECT id, target_id, value, recorded_at
        FROM target_progress
        WHERE target_id = $1 AND deleted_at IS NULL
        ORDER BY recorded_at DESC
        LIMIT $2
        "#,
    )
    .bind(target_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
