//! Port for real-time alert delivery.

use crate::domain::Alert;

use super::define_port_error;

define_port_error! {
    /// Errors raised by alert publishers.
    pub enum AlertPublishError {
        /// The channel could not accept the alert.
        Delivery { message: String } =>
            "alert delivery failed: {message}",
    }
}

/// Pushes alerts to the owning doctor's live sessions.
///
/// Publishing is fire-and-forget; callers log and drop failures.
#[cfg_attr(test, mockall::automock)]
pub trait AlertPublisher: Send + Sync {
    /// Publish to `alert.doctor_id`'s channel, returning the number of
    /// sessions reached.
    fn publish(&self, alert: &Alert) -> Result<usize, AlertPublishError>;
}
