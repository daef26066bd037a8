//! Port for measurement persistence.

use async_trait::async_trait;

use crate::domain::{Measurement, MeasurementId, NewMeasurement};

use super::define_port_error;

define_port_error! {
    /// Errors raised by measurement repository adapters.
    pub enum MeasurementRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "measurement repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "measurement repository query failed: {message}",
    }
}

/// Append-only store of raw vital-sign submissions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Persist a measurement and return the stored record.
    async fn save(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<Measurement, MeasurementRepositoryError>;

    /// Fetch a measurement by id.
    async fn find_by_id(
        &self,
        id: &MeasurementId,
    ) -> Result<Option<Measurement>, MeasurementRepositoryError>;
}
