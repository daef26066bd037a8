//! Driving port for a doctor's alert inbox.

use async_trait::async_trait;

use crate::domain::{Alert, AlertFilter, AlertId, AlertView, Error, UserId};

/// Query and read-state operations, all scoped to the calling doctor.
///
/// Alerts owned by another doctor surface as `not_found`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertInbox: Send + Sync {
    /// Alerts newest first, with patient and measurement resolved.
    async fn list(&self, doctor_id: UserId, filter: AlertFilter) -> Result<Vec<AlertView>, Error>;

    async fn get(&self, doctor_id: UserId, alert_id: AlertId) -> Result<AlertView, Error>;

    /// Idempotent.
    async fn mark_read(&self, doctor_id: UserId, alert_id: AlertId) -> Result<Alert, Error>;

    /// Idempotent.
    async fn mark_unread(&self, doctor_id: UserId, alert_id: AlertId) -> Result<Alert, Error>;
}
