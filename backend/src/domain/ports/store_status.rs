//! Port reporting which persistence backend is wired and whether it answers.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

/// Persistence backend in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Snapshot returned by [`StoreStatus::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatusReport {
    pub ok: bool,
    pub backend: StoreBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreStatus: Send + Sync {
    async fn check(&self) -> StoreStatusReport;
}
