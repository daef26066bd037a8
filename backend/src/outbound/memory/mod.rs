//! In-process adapters for every repository port.
//!
//! Used when no database URL is configured and by tests. Data lives only
//! as long as the process.

mod alerts;
mod records;
mod users;

pub use alerts::InMemoryAlertRepository;
pub use records::{
    InMemoryHypertensionRepository, InMemoryMeasurementRepository, InMemoryPredictionRepository,
};
pub use users::InMemoryUserRepository;

use async_trait::async_trait;

use crate::domain::ports::{StoreBackend, StoreStatus, StoreStatusReport};

/// Reports the in-memory backend as always reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStoreStatus;

#[async_trait]
impl StoreStatus for MemoryStoreStatus {
    async fn check(&self) -> StoreStatusReport {
        StoreStatusReport {
            ok: true,
            backend: StoreBackend::Memory,
            error: None,
        }
    }
}

/// Recover the guard from a poisoned lock; the data is plain values.
fn recover<G>(result: Result<G, std::sync::PoisonError<G>>) -> G {
    result.unwrap_or_else(std::sync::PoisonError::into_inner)
}
