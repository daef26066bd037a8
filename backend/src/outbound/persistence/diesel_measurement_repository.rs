//! PostgreSQL-backed [`MeasurementRepository`] and [`HypertensionRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    HypertensionRepository, HypertensionRepositoryError, MeasurementRepository,
    MeasurementRepositoryError,
};
use crate::domain::{
    Measurement, MeasurementId, NewHypertensionRecord, NewMeasurement, RecordReceipt, UserId,
    VitalSigns,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{MeasurementRow, NewHypertensionRow, NewMeasurementRow};
use super::pool::{DbPool, PoolError};
use super::schema::{hypertension_records, measurements};

#[derive(Clone)]
pub struct DieselMeasurementRepository {
    pool: DbPool,
}

impl DieselMeasurementRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> MeasurementRepositoryError {
    map_pool_error(error, MeasurementRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> MeasurementRepositoryError {
    map_diesel_error(
        error,
        MeasurementRepositoryError::query,
        MeasurementRepositoryError::connection,
    )
}

fn row_to_measurement(row: MeasurementRow) -> Measurement {
    Measurement {
        id: MeasurementId(row.id),
        patient_id: row.patient_id.map(UserId::from_uuid),
        vitals: VitalSigns {
            systolic: row.systolic,
            diastolic: row.diastolic,
            heart_rate: row.heart_rate,
            glucose_level: row.glucose_level,
            temperature: row.temperature,
            oxygen_saturation: row.oxygen_saturation,
        },
        created_at: row.created_at,
    }
}

#[async_trait]
impl MeasurementRepository for DieselMeasurementRepository {
    async fn save(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<Measurement, MeasurementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let vitals = measurement.vitals;
        let row = NewMeasurementRow {
            id: Uuid::new_v4(),
            patient_id: measurement.patient_id.map(|id| *id.as_uuid()),
            systolic: vitals.systolic,
            diastolic: vitals.diastolic,
            heart_rate: vitals.heart_rate,
            glucose_level: vitals.glucose_level,
            temperature: vitals.temperature,
            oxygen_saturation: vitals.oxygen_saturation,
        };
        diesel::insert_into(measurements::table)
            .values(&row)
            .returning(MeasurementRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_measurement)
            .map_err(diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &MeasurementId,
    ) -> Result<Option<Measurement>, MeasurementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        measurements::table
            .find(id.0)
            .select(MeasurementRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(row_to_measurement))
            .map_err(diesel_error)
    }
}

#[derive(Clone)]
pub struct DieselHypertensionRepository {
    pool: DbPool,
}

impl DieselHypertensionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HypertensionRepository for DieselHypertensionRepository {
    async fn save(
        &self,
        record: &NewHypertensionRecord,
    ) -> Result<RecordReceipt, HypertensionRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, HypertensionRepositoryError::connection))?;
        let vitals = record.vitals;
        let answers = &record.questionnaire;
        let row = NewHypertensionRow {
            id: Uuid::new_v4(),
            patient_id: record.patient_id.map(|id| *id.as_uuid()),
            systolic: vitals.systolic,
            diastolic: vitals.diastolic,
            heart_rate: vitals.heart_rate,
            glucose_level: vitals.glucose_level,
            temperature: vitals.temperature,
            oxygen_saturation: vitals.oxygen_saturation,
            age: answers.age,
            salt_intake: answers.salt_intake,
            stress_score: answers.stress_score,
            bp_history: answers.bp_history.as_deref(),
            sleep_duration: answers.sleep_duration,
            bmi: answers.bmi,
            medication: answers.medication.as_deref(),
            family_history: answers.family_history.as_deref(),
            exercise_level: answers.exercise_level.as_deref(),
            smoking_status: answers.smoking_status.as_deref(),
        };
        let (id, created_at) = diesel::insert_into(hypertension_records::table)
            .values(&row)
            .returning((hypertension_records::id, hypertension_records::created_at))
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    err,
                    HypertensionRepositoryError::query,
                    HypertensionRepositoryError::connection,
                )
            })?;
        Ok(RecordReceipt { id, created_at })
    }
}
