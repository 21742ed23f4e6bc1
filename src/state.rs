use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::gate::repo::{AttendanceStore, PgAttendanceStore};
use crate::membership::repo::{MembershipStore, PgMembershipStore};

/// Shared application state, passed down explicitly; there is no global
/// database handle anywhere.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub memberships: Arc<dyn MembershipStore>,
    pub attendance: Arc<dyn AttendanceStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        let memberships = Arc::new(PgMembershipStore::new(db.clone())) as Arc<dyn MembershipStore>;
        let attendance = Arc::new(PgAttendanceStore::new(db.clone())) as Arc<dyn AttendanceStore>;
        Self {
            db,
            config,
            memberships,
            attendance,
        }
    }
}
