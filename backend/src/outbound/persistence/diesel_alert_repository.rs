//! PostgreSQL-backed [`AlertRepository`].
//!
//! Every query filters on `doctor_id` except `list_by_measurement`, which
//! serves operator tooling.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{AlertRepository, AlertRepositoryError};
use crate::domain::{
    Alert, AlertFilter, AlertId, MeasurementId, NewAlert, PatientSnapshot, RiskFlag, SymptomTags,
    UserId,
};

use super::diesel_prediction_repository::{flag_from_db, flag_to_db};
use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AlertRow, NewAlertRow};
use super::pool::{DbPool, PoolError};
use super::schema::alerts;

#[derive(Clone)]
pub struct DieselAlertRepository {
    pool: DbPool,
}

impl DieselAlertRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> AlertRepositoryError {
    map_pool_error(error, AlertRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> AlertRepositoryError {
    map_diesel_error(
        error,
        AlertRepositoryError::query,
        AlertRepositoryError::connection,
    )
}

fn row_to_alert(row: AlertRow) -> Result<Alert, AlertRepositoryError> {
    let prediction = flag_from_db(row.prediction)
        .ok_or_else(|| AlertRepositoryError::query("stored prediction flag is invalid"))?;
    let patient_snapshot: PatientSnapshot = serde_json::from_value(row.patient_snapshot)
        .unwrap_or_else(|err| {
            warn!(alert_id = %row.id, error = %err, "stored patient snapshot is malformed");
            PatientSnapshot::default()
        });
    Ok(Alert {
        id: AlertId(row.id),
        patient_id: row.patient_id.map(UserId::from_uuid),
        doctor_id: UserId::from_uuid(row.doctor_id),
        measurement_id: row.measurement_id.map(MeasurementId),
        prediction,
        ml_body: row.ml_body,
        patient_snapshot,
        message: row.message,
        symptoms: SymptomTags::new(row.symptoms),
        read: row.read,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_alerts(rows: Vec<AlertRow>) -> Result<Vec<Alert>, AlertRepositoryError> {
    rows.into_iter().map(row_to_alert).collect()
}

#[async_trait]
impl AlertRepository for DieselAlertRepository {
    async fn insert_batch(&self, batch: &[NewAlert]) -> Result<Vec<Alert>, AlertRepositoryError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let now = Utc::now();
        let prepared: Vec<Alert> = batch
            .iter()
            .map(|new| Alert::from_new(new.clone(), now))
            .collect();
        let snapshots = prepared
            .iter()
            .map(|alert| serde_json::to_value(&alert.patient_snapshot))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| AlertRepositoryError::query(err.to_string()))?;
        let rows: Vec<NewAlertRow<'_>> = prepared
            .iter()
            .zip(snapshots)
            .map(|(alert, snapshot)| NewAlertRow {
                id: alert.id.0,
                patient_id: alert.patient_id.map(|id| *id.as_uuid()),
                doctor_id: *alert.doctor_id.as_uuid(),
                measurement_id: alert.measurement_id.map(|id| id.0),
                prediction: flag_to_db(alert.prediction),
                ml_body: &alert.ml_body,
                patient_snapshot: snapshot,
                message: &alert.message,
                symptoms: alert.symptoms.as_slice(),
                read: alert.read,
                created_at: alert.created_at,
                updated_at: alert.updated_at,
            })
            .collect();

        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(alerts::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(prepared)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &UserId,
        filter: AlertFilter,
    ) -> Result<Vec<Alert>, AlertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = alerts::table
            .filter(alerts::doctor_id.eq(doctor_id.as_uuid()))
            .select(AlertRow::as_select())
            .order((alerts::created_at.desc(), alerts::id.desc()))
            .into_boxed();
        if filter.risk_only {
            query = query.filter(alerts::prediction.eq(flag_to_db(RiskFlag::High)));
        }
        let rows = query.load(&mut conn).await.map_err(diesel_error)?;
        rows_to_alerts(rows)
    }

    async fn find_for_doctor(
        &self,
        doctor_id: &UserId,
        alert_id: &AlertId,
    ) -> Result<Option<Alert>, AlertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        alerts::table
            .filter(alerts::id.eq(alert_id.0))
            .filter(alerts::doctor_id.eq(doctor_id.as_uuid()))
            .select(AlertRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_alert)
            .transpose()
    }

    async fn set_read(
        &self,
        doctor_id: &UserId,
        alert_id: &AlertId,
        read: bool,
    ) -> Result<Option<Alert>, AlertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let target = alerts::table
            .filter(alerts::id.eq(alert_id.0))
            .filter(alerts::doctor_id.eq(doctor_id.as_uuid()));
        diesel::update(target)
            .set((alerts::read.eq(read), alerts::updated_at.eq(Utc::now())))
            .returning(AlertRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_alert)
            .transpose()
    }

    async fn list_by_measurement(
        &self,
        measurement_id: &MeasurementId,
    ) -> Result<Vec<Alert>, AlertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = alerts::table
            .filter(alerts::measurement_id.eq(measurement_id.0))
            .select(AlertRow::as_select())
            .order(alerts::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_alerts(rows)
    }
}
