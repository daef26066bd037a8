//! Port for prediction persistence.

use async_trait::async_trait;

use crate::domain::{NewPrediction, Prediction};

use super::define_port_error;

define_port_error! {
    /// Errors raised by prediction repository adapters.
    pub enum PredictionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "prediction repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "prediction repository query failed: {message}",
    }
}

/// Append-only audit store of risk assessments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Persist a prediction and return the stored record.
    async fn save(&self, prediction: &NewPrediction)
    -> Result<Prediction, PredictionRepositoryError>;

    /// Most recent high-risk predictions, newest first.
    async fn list_recent_high_risk(
        &self,
        limit: usize,
    ) -> Result<Vec<Prediction>, PredictionRepositoryError>;
}
