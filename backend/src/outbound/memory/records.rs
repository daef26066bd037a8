//! Append-only measurement, prediction, and hypertension stores.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::recover;
use crate::domain::ports::{
    HypertensionRepository, HypertensionRepositoryError, MeasurementRepository,
    MeasurementRepositoryError, PredictionRepository, PredictionRepositoryError,
};
use crate::domain::{
    Measurement, MeasurementId, NewHypertensionRecord, NewMeasurement, NewPrediction, Prediction,
    PredictionId, RecordReceipt,
};

#[derive(Debug, Default)]
pub struct InMemoryMeasurementRepository {
    rows: RwLock<Vec<Measurement>>,
}

impl InMemoryMeasurementRepository {
    pub fn len(&self) -> usize {
        recover(self.rows.read()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MeasurementRepository for InMemoryMeasurementRepository {
    async fn save(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<Measurement, MeasurementRepositoryError> {
        let stored = Measurement {
            id: MeasurementId(Uuid::new_v4()),
            patient_id: measurement.patient_id,
            vitals: measurement.vitals,
            created_at: Utc::now(),
        };
        recover(self.rows.write()).push(stored);
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        id: &MeasurementId,
    ) -> Result<Option<Measurement>, MeasurementRepositoryError> {
        Ok(recover(self.rows.read()).iter().find(|m| m.id == *id).copied())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPredictionRepository {
    rows: RwLock<Vec<Prediction>>,
}

impl InMemoryPredictionRepository {
    /// Every stored prediction in insertion order.
    pub fn all(&self) -> Vec<Prediction> {
        recover(self.rows.read()).clone()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    async fn save(
        &self,
        prediction: &NewPrediction,
    ) -> Result<Prediction, PredictionRepositoryError> {
        let stored = Prediction {
            id: PredictionId(Uuid::new_v4()),
            patient_id: prediction.patient_id,
            measurement_id: prediction.measurement_id,
            model: prediction.model.clone(),
            prediction: prediction.flag,
            features: prediction.features.clone(),
            ml_body: prediction.ml_body.clone(),
            created_at: Utc::now(),
        };
        recover(self.rows.write()).push(stored.clone());
        Ok(stored)
    }

    async fn list_recent_high_risk(
        &self,
        limit: usize,
    ) -> Result<Vec<Prediction>, PredictionRepositoryError> {
        Ok(recover(self.rows.read())
            .iter()
            .rev()
            .filter(|p| p.prediction.is_high())
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHypertensionRepository {
    rows: RwLock<Vec<(RecordReceipt, NewHypertensionRecord)>>,
}

impl InMemoryHypertensionRepository {
    pub fn len(&self) -> usize {
        recover(self.rows.read()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HypertensionRepository for InMemoryHypertensionRepository {
    async fn save(
        &self,
        record: &NewHypertensionRecord,
    ) -> Result<RecordReceipt, HypertensionRepositoryError> {
        let receipt = RecordReceipt {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        recover(self.rows.write()).push((receipt, record.clone()));
        Ok(receipt)
    }
}
