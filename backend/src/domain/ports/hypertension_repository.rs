//! Port for hypertension questionnaire persistence.

use async_trait::async_trait;

use crate::domain::{NewHypertensionRecord, RecordReceipt};

use super::define_port_error;

define_port_error! {
    /// Errors raised by hypertension repository adapters.
    pub enum HypertensionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "hypertension repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "hypertension repository query failed: {message}",
    }
}

/// Append-only store of hypertension submissions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HypertensionRepository: Send + Sync {
    async fn save(
        &self,
        record: &NewHypertensionRecord,
    ) -> Result<RecordReceipt, HypertensionRepositoryError>;
}
