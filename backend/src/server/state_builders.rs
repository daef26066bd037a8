//! Builders that assemble domain services and their adapters into the
//! shared HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use thiserror::Error;

use vitalwatch::domain::ports::{
    AlertRepository, HypertensionRepository, MeasurementRepository, PredictionRepository,
    StoreStatus, UserRepository,
};
use vitalwatch::domain::{
    AccountService, AlertDispatcher, AlertInboxService, RateLimitedWarner, RiskPipeline,
    RiskPipelineDeps, VitalsIntakeService,
};
use vitalwatch::inbound::http::state::HttpState;
use vitalwatch::outbound::memory::{
    InMemoryAlertRepository, InMemoryHypertensionRepository, InMemoryMeasurementRepository,
    InMemoryPredictionRepository, InMemoryUserRepository, MemoryStoreStatus,
};
use vitalwatch::outbound::ml::HttpRiskPredictor;
use vitalwatch::outbound::persistence::{
    DbPool, DieselAlertRepository, DieselHypertensionRepository, DieselMeasurementRepository,
    DieselPredictionRepository, DieselUserRepository, PostgresStoreStatus,
};
use vitalwatch::outbound::probe::TcpReachabilityProbe;
use vitalwatch::outbound::realtime::AlertHub;
use vitalwatch::outbound::security::{HmacTokenService, Pbkdf2PasswordHasher};

use super::ServerConfig;

/// Failures while wiring adapters.
#[derive(Debug, Error)]
pub enum StateBuildError {
    #[error("invalid ML base URL: {0}")]
    MlUrl(#[from] url::ParseError),
    #[error("failed to build ML HTTP client: {0}")]
    MlClient(#[from] reqwest::Error),
}

/// Repository adapters for one persistence backend.
struct Repositories {
    users: Arc<dyn UserRepository>,
    measurements: Arc<dyn MeasurementRepository>,
    hypertension: Arc<dyn HypertensionRepository>,
    predictions: Arc<dyn PredictionRepository>,
    alerts: Arc<dyn AlertRepository>,
    store: Arc<dyn StoreStatus>,
}

impl Repositories {
    fn postgres(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            measurements: Arc::new(DieselMeasurementRepository::new(pool.clone())),
            hypertension: Arc::new(DieselHypertensionRepository::new(pool.clone())),
            predictions: Arc::new(DieselPredictionRepository::new(pool.clone())),
            alerts: Arc::new(DieselAlertRepository::new(pool.clone())),
            store: Arc::new(PostgresStoreStatus::new(pool.clone())),
        }
    }

    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::default()),
            measurements: Arc::new(InMemoryMeasurementRepository::default()),
            hypertension: Arc::new(InMemoryHypertensionRepository::default()),
            predictions: Arc::new(InMemoryPredictionRepository::default()),
            alerts: Arc::new(InMemoryAlertRepository::default()),
            store: Arc::new(MemoryStoreStatus),
        }
    }

    fn for_pool(pool: Option<&DbPool>) -> Self {
        match pool {
            Some(pool) => Self::postgres(pool),
            None => {
                tracing::warn!("no database configured; records are kept in memory only");
                Self::in_memory()
            }
        }
    }
}

/// Build the HTTP state, publishing live alerts through `hub`.
///
/// # Errors
///
/// Returns [`StateBuildError`] when the predictor client cannot be built.
pub fn build_http_state(
    config: &ServerConfig,
    hub: &AlertHub,
) -> Result<HttpState, StateBuildError> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repos = Repositories::for_pool(config.db_pool.as_ref());

    let tokens = Arc::new(HmacTokenService::new(
        config.token_secret.as_bytes(),
        config.token_ttl_seconds,
        Arc::clone(&clock),
    ));
    let predictor = Arc::new(HttpRiskPredictor::new(
        config.ml.base_url()?,
        config.ml.request_timeout(),
    )?);
    let probe = Arc::new(TcpReachabilityProbe::new(
        config.ml.host(),
        config.ml.port(),
        config.ml.probe_timeout(),
    ));

    let dispatcher = AlertDispatcher::new(Arc::clone(&repos.alerts), Arc::new(hub.clone()));
    let risk = RiskPipeline::new(
        RiskPipelineDeps {
            probe,
            predictor: predictor.clone(),
            measurements: Arc::clone(&repos.measurements),
            predictions: repos.predictions,
            users: Arc::clone(&repos.users),
            dispatcher,
            warner: Arc::new(RateLimitedWarner::new(
                config.ml.warn_cooldown(),
                Arc::clone(&clock),
            )),
        },
        config.ml.allow_fallback,
    );

    Ok(HttpState {
        accounts: Arc::new(AccountService::new(
            Arc::clone(&repos.users),
            Arc::new(Pbkdf2PasswordHasher::default()),
            tokens.clone(),
            clock,
        )),
        alerts: Arc::new(AlertInboxService::new(
            repos.alerts,
            Arc::clone(&repos.users),
            Arc::clone(&repos.measurements),
        )),
        risk: Arc::new(risk),
        intake: Arc::new(VitalsIntakeService::new(
            repos.measurements,
            repos.hypertension,
            repos.users,
        )),
        tokens,
        predictor,
        store: repos.store,
    })
}
