//! Liveness check for the PostgreSQL backend.

use async_trait::async_trait;
use diesel::sql_query;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{StoreBackend, StoreStatus, StoreStatusReport};

use super::pool::DbPool;

/// Reports whether a pooled connection can run `SELECT 1`.
#[derive(Clone)]
pub struct PostgresStoreStatus {
    pool: DbPool,
}

impl PostgresStoreStatus {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn ping(&self) -> Result<(), String> {
        let mut conn = self.pool.get().await.map_err(|err| err.to_string())?;
        sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}

#[async_trait]
impl StoreStatus for PostgresStoreStatus {
    async fn check(&self) -> StoreStatusReport {
        match self.ping().await {
            Ok(()) => StoreStatusReport {
                ok: true,
                backend: StoreBackend::Postgres,
                error: None,
            },
            Err(error) => {
                warn!(%error, "database status check failed");
                StoreStatusReport {
                    ok: false,
                    backend: StoreBackend::Postgres,
                    error: Some(error),
                }
            }
        }
    }
}
