use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

pub async fn list_followed_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Template>> {
    let rows = sqlx::query_as::<_, Template>(
        r#"
        SELECT t.id, t.name, t.description
        FROM templates t
        JOIN user_template_follows utf ON utf.template_id = t.id
        WHERE utf.user_id = $1 AND utf.deleted_at IS NULL AND t.deleted_at IS NULL
        ORDER BY t.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Template>> {
    let row = sqlx::query_as::<_, Template>(
        r#"SELECT id, name, description FROM templates WHERE id = $1 AND deleted_at IS NULL"#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Idempotent follow: an existing link is left untouched.
pub async fn follow(
    db: &PgPool,
    user_id: Uuid,
    template_id: Uuid,
    followed_at: OffsetDateTime,
) -> anyhow::Result<()> {
    let existing: Option<Uuid> = sqlx::query_scalar(
        r#"
        SELECT id FROM user_template_follows
        WHERE user_id = $1 AND template_id = $2 AND deleted_at IS NULL
        "#,
    )
    .bind(user_id)
    .bind(template_id)
    .fetch_optional(db)
    .await?;
    if existing.is_some() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO user_template_follows (user_id, template_id, followed_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(template_id)
    .bind(followed_at)
    .execute(db)
    .await?;
    Ok(())
}
