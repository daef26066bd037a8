//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed entities of the monitoring pipeline
//! (vitals, measurements, predictions, alerts, accounts) and the services
//! that orchestrate them. Nothing in here knows about HTTP, SQL, or sockets;
//! adapters reach the domain only through [`ports`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `RiskPipeline`: predict, persist, match, and alert.
//! - `AlertInboxService`: doctor-scoped alert queries and read state.
//! - `VitalsIntakeService`, `AccountService`: submissions and accounts.

pub mod account_service;
pub mod alert;
pub mod alert_service;
pub mod auth;
pub mod error;
pub mod fallback;
pub mod hypertension;
pub mod intake_service;
pub mod matching;
pub mod measurement;
pub mod ml_warning;
pub mod ports;
pub mod prediction;
pub mod risk_pipeline;
pub mod trace_id;
pub mod user;
pub mod vitals;

pub use self::account_service::AccountService;
pub use self::alert::{
    Alert, AlertFilter, AlertId, AlertSubject, AlertView, NewAlert, PatientSnapshot,
    PatientSummary, alert_message,
};
pub use self::alert_service::{AlertDispatcher, AlertDraft, AlertInboxService};
pub use self::auth::{
    CredentialsError, Identity, LoginCredentials, Registration, RegistrationDraft, TokenClaims,
};
pub use self::error::{Error, ErrorCode};
pub use self::fallback::{FALLBACK_NOTE, fallback_flag, fallback_prediction};
pub use self::hypertension::{HypertensionQuestionnaire, NewHypertensionRecord};
pub use self::intake_service::VitalsIntakeService;
pub use self::matching::{TagSource, is_matching_doctor, match_doctors, resolve_patient_tags};
pub use self::measurement::{Measurement, MeasurementId, NewMeasurement, RecordReceipt};
pub use self::ml_warning::RateLimitedWarner;
pub use self::prediction::{
    HEART_MODEL, InvalidRiskFlag, ModelPrediction, NewPrediction, Prediction, PredictionId,
    PredictionSource, RiskFlag,
};
pub use self::risk_pipeline::{RiskPipeline, RiskPipelineDeps};
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, EmailError, NewUser, PasswordHash, Role, SymptomTags, UnknownRole, User, UserId,
    UserProfile,
};
pub use self::vitals::{FeatureVector, MissingVital, PartialVitals, VitalFindings, VitalSigns};

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Convenient result alias for driving-port operations.
pub type ApiResult<T> = Result<T, Error>;
