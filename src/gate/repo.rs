use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

pub const DIRECTION_IN: &str = "in";
pub const DIRECTION_OUT: &str = "out";
pub const SOURCE_QR: &str = "qr";

/// Append-only attendance ledger row. Direction is always derived from the
/// previous row, never supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub direction: String,
    pub source: String,
    pub occurred_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewAttendanceLog {
    pub user_id: Uuid,
    pub direction: String,
    pub source: String,
    pub occurred_at: OffsetDateTime,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn create(&self, entry: NewAttendanceLog) -> anyhow::Result<AttendanceLog>;
    async fn find_last_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<AttendanceLog>>;
    async fn list_by_user(&self, user_id: Uuid, limit: i64) -> anyhow::Result<Vec<AttendanceLog>>;
}

pub struct PgAttendanceStore {
    db: PgPool,
}

impl PgAttendanceStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const COLUMNS: &str = "id, user_id, direction, source, occurred_at";

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn create(&self, entry: NewAttendanceLog) -> anyhow::Result<AttendanceLog> {
        let row = sqlx::query_as::<_, AttendanceLog>(&format!(
            r#"
            INSERT INTO attendance_logs (user_id, direction, source, occurred_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#,
        ))
        .bind(entry.user_id)
        .bind(&entry.direction)
        .bind(&entry.source)
        .bind(entry.occurred_at)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_last_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<AttendanceLog>> {
        let row = sqlx::query_as::<_, AttendanceLog>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM attendance_logs
            WHERE user_id = $1
            ORDER BY occurred_at DESC
            LIMIT 1
            "#,
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<AttendanceLog>> {
        let rows = sqlx::query_as::<_, AttendanceLog>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM attendance_logs
            WHERE user_id = $1
            ORDER BY occurred_at DESC
            LIMIT $2
            "#,
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemAttendanceStore {
        rows: Mutex<Vec<AttendanceLog>>,
    }

    impl MemAttendanceStore {
        pub fn rows(&self) -> Vec<AttendanceLog> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AttendanceStore for MemAttendanceStore {
        async fn create(&self, entry: NewAttendanceLog) -> anyhow::Result<AttendanceLog> {
            let row = AttendanceLog {
                id: Uuid::new_v4(),
                user_id: entry.user_id,
                direction: entry.direction,
                source: entry.source,
                occurred_at: entry.occurred_at,
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn find_last_by_user(
            &self,
            user_id: Uuid,
        ) -> anyhow::Result<Option<AttendanceLog>> {
            let mut rows: Vec<AttendanceLog> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
            Ok(rows.into_iter().next())
        }

        async fn list_by_user(
            &self,
            user_id: Uuid,
            limit: i64,
        ) -> anyhow::Result<Vec<AttendanceLog>> {
            let mut rows: Vec<AttendanceLog> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
            rows.truncate(limit as usize);
            Ok(rows)
        }
    }
}
