use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSetting {
    pub id: Uuid,
    pub user_id: Uuid,
    pub push_enabled: bool,
    pub email_enabled: bool,
    pub language: String,
}

const COLUMNS: &str = "id, user_id, push_enabled, email_enabled, language";

/// Fetch the user's settings row, creating the defaults on first access.
pub async fn get_or_create(db: &PgPool, user_id: Uuid) -> anyhow::Result<UserSetting> {
    let existing = sqlx::query_as::<_, UserSetting>(&format!(
        r#"SELECT {COLUMNS} FROM user_settings WHERE user_id = $1"#,
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    if let Some(s) = existing {
        return Ok(s);
    }

    // Concurrent first reads can both try to insert; the unique constraint
    // on user_id keeps one row, so fall back to a re-read on conflict.
    let created = sqlx::query_as::<_, UserSetting>(&format!(
        r#"
        INSERT INTO user_settings (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING {COLUMNS}
        "#,
    ))
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(created)
}

pub async fn update(db: &PgPool, setting: &UserSetting) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE user_settings
        SET push_enabled = $2, email_enabled = $3, language = $4, updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(setting.user_id)
    .bind(setting.push_enabled)
    .bind(setting.email_enabled)
    .bind(&setting.language)
    .execute(db)
    .await?;
    Ok(())
}
