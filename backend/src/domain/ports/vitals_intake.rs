//! Driving port for direct vital-sign submissions.

use async_trait::async_trait;

use crate::domain::{Error, NewHypertensionRecord, NewMeasurement, RecordReceipt};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VitalsIntake: Send + Sync {
    /// Store a complete measurement.
    async fn record_measurement(&self, measurement: NewMeasurement)
    -> Result<RecordReceipt, Error>;

    /// Store a hypertension questionnaire submission.
    async fn record_hypertension(
        &self,
        record: NewHypertensionRecord,
    ) -> Result<RecordReceipt, Error>;
}
