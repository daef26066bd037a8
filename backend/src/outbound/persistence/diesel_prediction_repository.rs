//! PostgreSQL-backed [`PredictionRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{PredictionRepository, PredictionRepositoryError};
use crate::domain::{
    FeatureVector, MeasurementId, NewPrediction, Prediction, PredictionId, RiskFlag, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewPredictionRow, PredictionRow};
use super::pool::{DbPool, PoolError};
use super::schema::predictions;

#[derive(Clone)]
pub struct DieselPredictionRepository {
    pool: DbPool,
}

impl DieselPredictionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> PredictionRepositoryError {
    map_pool_error(error, PredictionRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> PredictionRepositoryError {
    map_diesel_error(
        error,
        PredictionRepositoryError::query,
        PredictionRepositoryError::connection,
    )
}

pub(super) fn flag_to_db(flag: RiskFlag) -> i16 {
    i16::from(flag.as_u8())
}

pub(super) fn flag_from_db(value: i16) -> Option<RiskFlag> {
    u8::try_from(value)
        .ok()
        .and_then(|raw| RiskFlag::try_from(raw).ok())
}

fn row_to_prediction(row: PredictionRow) -> Result<Prediction, PredictionRepositoryError> {
    let prediction = flag_from_db(row.prediction)
        .ok_or_else(|| PredictionRepositoryError::query("stored prediction flag is invalid"))?;
    let features: FeatureVector = serde_json::from_value(row.features).unwrap_or_else(|err| {
        warn!(prediction_id = %row.id, error = %err, "stored features are not a vector");
        FeatureVector::default()
    });
    Ok(Prediction {
        id: PredictionId(row.id),
        patient_id: row.patient_id.map(UserId::from_uuid),
        measurement_id: row.measurement_id.map(MeasurementId),
        model: row.model,
        prediction,
        features,
        ml_body: row.ml_body,
        created_at: row.created_at,
    })
}

#[async_trait]
impl PredictionRepository for DieselPredictionRepository {
    async fn save(
        &self,
        prediction: &NewPrediction,
    ) -> Result<Prediction, PredictionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let features = serde_json::to_value(&prediction.features)
            .map_err(|err| PredictionRepositoryError::query(err.to_string()))?;
        let row = NewPredictionRow {
            id: Uuid::new_v4(),
            patient_id: prediction.patient_id.map(|id| *id.as_uuid()),
            measurement_id: prediction.measurement_id.map(|id| id.0),
            model: &prediction.model,
            prediction: flag_to_db(prediction.flag),
            features,
            ml_body: &prediction.ml_body,
        };
        let stored = diesel::insert_into(predictions::table)
            .values(&row)
            .returning(PredictionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        row_to_prediction(stored)
    }

    async fn list_recent_high_risk(
        &self,
        limit: usize,
    ) -> Result<Vec<Prediction>, PredictionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<PredictionRow> = predictions::table
            .filter(predictions::prediction.eq(flag_to_db(RiskFlag::High)))
            .order(predictions::created_at.desc())
            .limit(limit)
            .select(PredictionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_prediction).collect()
    }
}
