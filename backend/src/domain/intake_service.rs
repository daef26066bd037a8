//! Direct measurement and hypertension submissions.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    HypertensionRepository, HypertensionRepositoryError, MeasurementRepository,
    MeasurementRepositoryError, UserRepository, UserRepositoryError, VitalsIntake,
};
use crate::domain::{Error, NewHypertensionRecord, NewMeasurement, RecordReceipt, UserId};

fn map_measurement_error(error: MeasurementRepositoryError) -> Error {
    match error {
        MeasurementRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("measurement store unavailable: {message}"))
        }
        MeasurementRepositoryError::Query { message } => {
            Error::internal(format!("measurement store error: {message}"))
        }
    }
}

fn map_hypertension_error(error: HypertensionRepositoryError) -> Error {
    match error {
        HypertensionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("hypertension store unavailable: {message}"))
        }
        HypertensionRepositoryError::Query { message } => {
            Error::internal(format!("hypertension store error: {message}"))
        }
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

/// Implements [`VitalsIntake`]. Unlike the prediction pipeline, write
/// failures here are surfaced to the caller.
#[derive(Clone)]
pub struct VitalsIntakeService {
    measurements: Arc<dyn MeasurementRepository>,
    hypertension: Arc<dyn HypertensionRepository>,
    users: Arc<dyn UserRepository>,
}

impl VitalsIntakeService {
    pub fn new(
        measurements: Arc<dyn MeasurementRepository>,
        hypertension: Arc<dyn HypertensionRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            measurements,
            hypertension,
            users,
        }
    }

    /// Keep `patient_id` only when it names a stored account.
    async fn resolve_patient(&self, patient_id: Option<UserId>) -> Result<Option<UserId>, Error> {
        let Some(id) = patient_id else {
            return Ok(None);
        };
        let found = self.users.find_by_id(&id).await.map_err(map_user_error)?;
        if found.is_none() {
            warn!(patient_id = %id, "unknown patient id; recording anonymously");
        }
        Ok(found.map(|user| user.id))
    }
}

#[async_trait]
impl VitalsIntake for VitalsIntakeService {
    async fn record_measurement(
        &self,
        mut measurement: NewMeasurement,
    ) -> Result<RecordReceipt, Error> {
        measurement.patient_id = self.resolve_patient(measurement.patient_id).await?;
        let saved = self
            .measurements
            .save(&measurement)
            .await
            .map_err(map_measurement_error)?;
        info!(measurement_id = %saved.id, "measurement saved");
        Ok(RecordReceipt::from(&saved))
    }

    async fn record_hypertension(
        &self,
        mut record: NewHypertensionRecord,
    ) -> Result<RecordReceipt, Error> {
        record.patient_id = self.resolve_patient(record.patient_id).await?;
        let receipt = self
            .hypertension
            .save(&record)
            .await
            .map_err(map_hypertension_error)?;
        info!(record_id = %receipt.id, "hypertension record saved");
        Ok(receipt)
    }
}
