use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_EXPIRED: &str = "expired";

/// Membership row. History is append-only; the only mutation ever applied is
/// the status flip when a renewal expires prior active rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub plan: String,
    pub starts_at: OffsetDateTime,
    pub ends_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMembership {
    pub user_id: Uuid,
    pub status: String,
    pub plan: String,
    pub starts_at: OffsetDateTime,
    pub ends_at: OffsetDateTime,
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn create(&self, m: NewMembership) -> anyhow::Result<Membership>;
    async fn expire_active_for_user(
        &self,
        user_id: Uuid,
        expired_at: OffsetDateTime,
    ) -> anyhow::Result<u64>;
    async fn find_latest_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Membership>>;
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Membership>>;
}

pub struct PgMembershipStore {
    db: PgPool,
}

impl PgMembershipStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const COLUMNS: &str = "id, user_id, status, plan, starts_at, ends_at, created_at, updated_at";

#[async_trait]
impl MembershipStore for PgMembershipStore {
    async fn create(&self, m: NewMembership) -> anyhow::Result<Membership> {
        let row = sqlx::query_as::<_, Membership>(&format!(
            r#"
            INSERT INTO memberships (user_id, status, plan, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(m.user_id)
        .bind(&m.status)
        .bind(&m.plan)
        .bind(m.starts_at)
        .bind(m.ends_at)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn expire_active_for_user(
        &self,
        user_id: Uuid,
        expired_at: OffsetDateTime,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET status = $3, ends_at = $2, updated_at = NOW()
            WHERE user_id = $1 AND status = $4
            "#,
        )
        .bind(user_id)
        .bind(expired_at)
        .bind(STATUS_EXPIRED)
        .bind(STATUS_ACTIVE)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn find_latest_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Membership>> {
        let row = sqlx::query_as::<_, Membership>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM memberships
            WHERE user_id = $1
            ORDER BY ends_at DESC
            LIMIT 1
            "#,
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Membership>> {
        let rows = sqlx::query_as::<_, Membership>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM memberships
            WHERE user_id = $1
            ORDER BY ends_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store standing in for Postgres in unit tests.
    #[derive(Default)]
    pub struct MemMembershipStore {
        rows: Mutex<Vec<Membership>>,
    }

    impl MemMembershipStore {
        pub fn with_rows(rows: Vec<Membership>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }

        pub fn rows(&self) -> Vec<Membership> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MembershipStore for MemMembershipStore {
        async fn create(&self, m: NewMembership) -> anyhow::Result<Membership> {
            let now = OffsetDateTime::now_utc();
            let row = Membership {
                id: Uuid::new_v4(),
                user_id: m.user_id,
                status: m.status,
                plan: m.plan,
                starts_at: m.starts_at,
                ends_at: m.ends_at,
                created_at: now,
                updated_at: now,
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn expire_active_for_user(
            &self,
            user_id: Uuid,
            expired_at: OffsetDateTime,
        ) -> anyhow::Result<u64> {
            let mut rows = self.rows.lock().unwrap();
            let mut touched = 0;
            for row in rows.iter_mut() {
                if row.user_id == user_id && row.status == STATUS_ACTIVE {
                    row.status = STATUS_EXPIRED.into();
                    row.ends_at = expired_at;
                    touched += 1;
                }
            }
            Ok(touched)
        }

        async fn find_latest_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Membership>> {
            Ok(self
                .list_by_user(user_id)
                .await?
                .into_iter()
                .next())
        }

        async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Membership>> {
            let mut rows: Vec<Membership> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.ends_at.cmp(&a.ends_at));
            Ok(rows)
        }
    }
}
