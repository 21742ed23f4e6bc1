use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User account row. Soft-deleted rows are invisible to every query here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str =
    "id, name, email, phone, address, password_hash, is_active, created_at, updated_at";

impl User {
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        phone: Option<&str>,
        address: Option<&str>,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, phone, address, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn find_all(
        db: &PgPool,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<User>, i64)> {
        let total: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE deleted_at IS NULL"#)
                .fetch_one(db)
                .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(db)
        .await?;

        Ok((users, total))
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"#,
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Persist the mutable columns of an already-loaded user.
    pub async fn update(&self, db: &PgPool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, phone = $4, address = $5,
                password_hash = $6, is_active = $7, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.email)
        .bind(&self.phone)
        .bind(&self.address)
        .bind(&self.password_hash)
        .bind(self.is_active)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn soft_delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result =
            sqlx::query(r#"UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL"#)
                .bind(id)
                .execute(db)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
