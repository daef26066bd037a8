//! Port for alert persistence and read-state changes.

use async_trait::async_trait;

use crate::domain::{Alert, AlertFilter, AlertId, MeasurementId, NewAlert, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by alert repository adapters.
    pub enum AlertRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "alert repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "alert repository query failed: {message}",
    }
}

/// Store of doctor-scoped alerts.
///
/// Every read and update is keyed by the owning doctor; an alert belonging to
/// someone else is indistinguishable from one that does not exist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertRepository: Send + Sync {
    /// Persist all alerts in one batch, returning them in input order.
    async fn insert_batch(&self, alerts: &[NewAlert]) -> Result<Vec<Alert>, AlertRepositoryError>;

    /// Alerts owned by `doctor_id`, newest first.
    async fn list_for_doctor(
        &self,
        doctor_id: &UserId,
        filter: AlertFilter,
    ) -> Result<Vec<Alert>, AlertRepositoryError>;

    /// A single alert, if it exists and belongs to `doctor_id`.
    async fn find_for_doctor(
        &self,
        doctor_id: &UserId,
        alert_id: &AlertId,
    ) -> Result<Option<Alert>, AlertRepositoryError>;

    /// Set the read flag on an owned alert and return the updated record.
    async fn set_read(
        &self,
        doctor_id: &UserId,
        alert_id: &AlertId,
        read: bool,
    ) -> Result<Option<Alert>, AlertRepositoryError>;

    /// Alerts raised for a given measurement, across all doctors.
    async fn list_by_measurement(
        &self,
        measurement_id: &MeasurementId,
    ) -> Result<Vec<Alert>, AlertRepositoryError>;
}
