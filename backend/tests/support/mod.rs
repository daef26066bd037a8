//! Shared wiring for integration tests.
//!
//! Integration tests under `backend/tests/` compile as separate crates; each
//! includes this module with `#[path]` and uses only what it needs.
#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};
use url::Url;
use vitalwatch::domain::{
    AccountService, AlertDispatcher, AlertInboxService, RateLimitedWarner, RiskPipeline,
    RiskPipelineDeps, VitalsIntakeService,
};
use vitalwatch::inbound::http::configure;
use vitalwatch::inbound::http::health::HealthState;
use vitalwatch::inbound::http::state::HttpState;
use vitalwatch::outbound::memory::{
    InMemoryAlertRepository, InMemoryHypertensionRepository, InMemoryMeasurementRepository,
    InMemoryPredictionRepository, InMemoryUserRepository, MemoryStoreStatus,
};
use vitalwatch::outbound::ml::HttpRiskPredictor;
use vitalwatch::outbound::probe::TcpReachabilityProbe;
use vitalwatch::outbound::realtime::AlertHub;
use vitalwatch::outbound::security::{HmacTokenService, Pbkdf2PasswordHasher};

/// Vitals that trip the rule-based fallback (systolic above 140).
pub const HIGH_RISK_INPUT: [f64; 6] = [150.0, 90.0, 80.0, 110.0, 37.0, 98.0];

/// Port with nothing listening, so the predictor is unreachable.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe port");
    listener.local_addr().expect("probe addr").port()
}

/// In-memory HTTP state whose predictor is unreachable, so every
/// assessment takes the fallback path.
pub fn in_memory_state(hub: &AlertHub) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let port = closed_port();
    let users = Arc::new(InMemoryUserRepository::default());
    let measurements = Arc::new(InMemoryMeasurementRepository::default());
    let alerts = Arc::new(InMemoryAlertRepository::default());
    let tokens = Arc::new(HmacTokenService::new(
        b"integration-secret",
        3600,
        Arc::clone(&clock),
    ));
    let predictor = Arc::new(
        HttpRiskPredictor::new(
            Url::parse(&format!("http://127.0.0.1:{port}/")).expect("ml url"),
            Duration::from_millis(200),
        )
        .expect("ml client"),
    );

    let risk = RiskPipeline::new(
        RiskPipelineDeps {
            probe: Arc::new(TcpReachabilityProbe::new(
                "127.0.0.1",
                port,
                Duration::from_millis(200),
            )),
            predictor: predictor.clone(),
            measurements: measurements.clone(),
            predictions: Arc::new(InMemoryPredictionRepository::default()),
            users: users.clone(),
            dispatcher: AlertDispatcher::new(alerts.clone(), Arc::new(hub.clone())),
            warner: Arc::new(RateLimitedWarner::new(
                Duration::from_secs(60),
                Arc::clone(&clock),
            )),
        },
        true,
    );

    HttpState {
        accounts: Arc::new(AccountService::new(
            users.clone(),
            Arc::new(Pbkdf2PasswordHasher::new(1_000)),
            tokens.clone(),
            clock,
        )),
        alerts: Arc::new(AlertInboxService::new(
            alerts,
            users.clone(),
            measurements.clone(),
        )),
        risk: Arc::new(risk),
        intake: Arc::new(VitalsIntakeService::new(
            measurements,
            Arc::new(InMemoryHypertensionRepository::default()),
            users,
        )),
        tokens,
        predictor,
        store: Arc::new(MemoryStoreStatus),
    }
}

/// Initialise the full REST surface over `state`.
pub async fn init_app(
    state: HttpState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(HealthState::new()))
            .configure(configure),
    )
    .await
}

/// Registered account: id and bearer token.
pub struct Account {
    pub id: String,
    pub token: String,
}

impl Account {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

/// Register an account and return its id and token.
pub async fn register<S>(app: &S, name: &str, role: &str, symptoms: &[&str]) -> Account
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let body: Value = test::call_and_read_body_json(
        app,
        TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "name": name,
                "email": format!("{}@clinic.example", name.to_lowercase()),
                "password": "correct horse",
                "role": role,
                "symptoms": symptoms,
            }))
            .to_request(),
    )
    .await;
    Account {
        id: body["data"]["id"].as_str().expect("user id").to_owned(),
        token: body["token"].as_str().expect("token").to_owned(),
    }
}
