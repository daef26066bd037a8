//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (repositories, predictor, probe, publisher, security) are
//! implemented by `outbound` adapters. Driving ports are implemented by the
//! domain services and called by `inbound` adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts;
mod alert_inbox;
mod alert_publisher;
mod alert_repository;
mod hypertension_repository;
mod measurement_repository;
mod password_hasher;
mod prediction_repository;
mod reachability_probe;
mod risk_assessment;
mod risk_predictor;
mod store_status;
mod token_service;
mod user_repository;
mod vitals_intake;

#[cfg(test)]
pub use accounts::MockAccounts;
pub use accounts::{Accounts, AuthSession};
#[cfg(test)]
pub use alert_inbox::MockAlertInbox;
pub use alert_inbox::AlertInbox;
#[cfg(test)]
pub use alert_publisher::MockAlertPublisher;
pub use alert_publisher::{AlertPublishError, AlertPublisher};
#[cfg(test)]
pub use alert_repository::MockAlertRepository;
pub use alert_repository::{AlertRepository, AlertRepositoryError};
#[cfg(test)]
pub use hypertension_repository::MockHypertensionRepository;
pub use hypertension_repository::{HypertensionRepository, HypertensionRepositoryError};
#[cfg(test)]
pub use measurement_repository::MockMeasurementRepository;
pub use measurement_repository::{MeasurementRepository, MeasurementRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use prediction_repository::MockPredictionRepository;
pub use prediction_repository::{PredictionRepository, PredictionRepositoryError};
#[cfg(test)]
pub use reachability_probe::MockReachabilityProbe;
pub use reachability_probe::{ProbeTarget, ReachabilityProbe};
#[cfg(test)]
pub use risk_assessment::MockRiskAssessment;
pub use risk_assessment::{AssessmentOutcome, AssessmentRequest, RiskAssessment};
#[cfg(test)]
pub use risk_predictor::MockRiskPredictor;
pub use risk_predictor::{
    PredictorResponse, PredictorRoute, PredictorStatus, RiskPredictor, RiskPredictorError,
};
#[cfg(test)]
pub use store_status::MockStoreStatus;
pub use store_status::{StoreBackend, StoreStatus, StoreStatusReport};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use vitals_intake::MockVitalsIntake;
pub use vitals_intake::VitalsIntake;
