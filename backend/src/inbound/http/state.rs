//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on ports, so
//! they stay testable with mocks and in-memory adapters.

use std::sync::Arc;

use crate::domain::ports::{
    AlertInbox, Accounts, RiskAssessment, RiskPredictor, StoreStatus, TokenService, VitalsIntake,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn Accounts>,
    pub alerts: Arc<dyn AlertInbox>,
    pub risk: Arc<dyn RiskAssessment>,
    pub intake: Arc<dyn VitalsIntake>,
    /// Verifies bearer tokens in [`super::auth`] extractors.
    pub tokens: Arc<dyn TokenService>,
    /// Used directly only by `GET /api/health`.
    pub predictor: Arc<dyn RiskPredictor>,
    pub store: Arc<dyn StoreStatus>,
}
