//! Account handlers: registration, login, and the caller's own profile.
//!
//! ```text
//! POST /register {"name":"Ada","email":"ada@example.com","password":"pw","role":"doctor"}
//! POST /login {"email":"ada@example.com","password":"pw"}
//! GET /me
//! PATCH /me/symptoms {"symptoms":["Diabetes"]}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::AuthSession;
use crate::domain::{
    CredentialsError, EmailError, Error, LoginCredentials, Registration, RegistrationDraft, Role,
    SymptomTags, UserProfile,
};

use super::ApiResult;
use super::auth::Authenticated;
use super::envelope::Envelope;
use super::state::HttpState;

/// Symptom tags as a JSON array or a comma-separated string.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SymptomsInput {
    List(Vec<String>),
    Csv(String),
}

impl From<SymptomsInput> for SymptomTags {
    fn from(value: SymptomsInput) -> Self {
        match value {
            SymptomsInput::List(tags) => Self::new(tags),
            SymptomsInput::Csv(raw) => Self::parse_list(&raw),
        }
    }
}

/// Registration request body for `POST /register`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
    pub number: Option<String>,
    pub symptoms: Option<SymptomsInput>,
}

/// Login request body for `POST /login`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body for `PATCH /me/symptoms`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SymptomsRequest {
    pub symptoms: Option<SymptomsInput>,
}

/// Profile plus the bearer token to present on later requests.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    pub data: UserProfile,
    pub token: String,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            success: true,
            data: session.profile,
            token: session.token,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SymptomsData {
    pub symptoms: SymptomTags,
}

fn map_credentials_error(err: CredentialsError) -> Error {
    let (field, code) = match &err {
        CredentialsError::MissingName => ("name", "missing_name"),
        CredentialsError::MissingEmail => ("email", "missing_email"),
        CredentialsError::MissingPassword => ("password", "missing_password"),
        CredentialsError::InvalidEmail(EmailError::Empty) => ("email", "missing_email"),
        CredentialsError::InvalidEmail(_) => ("email", "invalid_email"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn parse_role(raw: Option<&str>) -> Result<Role, Error> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(Role::default()),
        Some(value) => value.parse().map_err(|err: crate::domain::UnknownRole| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "role" }))
        }),
    }
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let role = parse_role(value.role.as_deref())?;
        Registration::try_from_draft(RegistrationDraft {
            name: &value.name,
            email: &value.email,
            password: &value.password,
            role,
            number: value.number.as_deref(),
            symptoms: value.symptoms.map(SymptomTags::from).unwrap_or_default(),
        })
        .map_err(map_credentials_error)
    }
}

/// Create an account and return a signed token for it.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Missing or invalid fields", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Account store unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let session = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(SessionResponse::from(session)))
}

/// Exchange email and password for a signed token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse),
        (status = 400, description = "Missing fields", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let request = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&request.email, &request.password)
        .map_err(map_credentials_error)?;
    let session = state.accounts.login(credentials).await?;
    Ok(web::Json(SessionResponse::from(session)))
}

/// Current caller's profile.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = Envelope<UserProfile>),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "me"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Envelope<UserProfile>>> {
    let profile = state.accounts.profile(caller.user_id()).await?;
    Ok(web::Json(Envelope::ok(profile)))
}

/// Replace the caller's symptom tags.
#[utoipa::path(
    patch,
    path = "/me/symptoms",
    request_body = SymptomsRequest,
    responses(
        (status = 200, description = "Updated tags", body = Envelope<SymptomsData>),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "updateSymptoms"
)]
#[patch("/me/symptoms")]
pub async fn update_symptoms(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<SymptomsRequest>,
) -> ApiResult<web::Json<Envelope<SymptomsData>>> {
    let tags = payload
        .into_inner()
        .symptoms
        .map(SymptomTags::from)
        .unwrap_or_default();
    let profile = state.accounts.update_symptoms(caller.user_id(), tags).await?;
    Ok(web::Json(Envelope::ok(SymptomsData {
        symptoms: profile.symptoms,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmailAddress, UserId};
    use crate::inbound::http::test_utils::{TestPorts, bearer, test_token};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::Value;

    fn profile(id: UserId, symptoms: SymptomTags) -> UserProfile {
        UserProfile {
            id,
            name: "Ada".to_owned(),
            email: EmailAddress::parse("ada@example.com").expect("email"),
            role: Role::Doctor,
            number: None,
            symptoms,
            created_at: Utc::now(),
        }
    }

    macro_rules! app {
        ($ports:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data($ports.into_data())
                    .app_data(
                        web::JsonConfig::default()
                            .error_handler(crate::inbound::http::error::json_error_handler),
                    )
                    .service(register)
                    .service(login)
                    .service(me)
                    .service(update_symptoms),
            )
            .await
        };
    }

    #[rstest]
    #[case(json!({ "email": "a@b.c", "password": "pw" }), "name")]
    #[case(json!({ "name": "Ada", "password": "pw" }), "email")]
    #[case(json!({ "name": "Ada", "email": "a@b.c" }), "password")]
    #[case(json!({ "name": "Ada", "email": "a@b.c", "password": "pw", "role": "nurse" }), "role")]
    #[actix_web::test]
    async fn register_rejects_incomplete_payloads(#[case] body: Value, #[case] field: &str) {
        let mut ports = TestPorts::default();
        ports.accounts.expect_register().times(0);
        let app = app!(ports);

        let request = actix_test::TestRequest::post()
            .uri("/register")
            .set_json(&body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value["code"], "invalid_request");
        assert_eq!(value["details"]["field"], field);
    }

    #[actix_web::test]
    async fn register_accepts_comma_separated_symptoms() {
        let mut ports = TestPorts::default();
        ports
            .accounts
            .expect_register()
            .withf(|reg| {
                reg.role == Role::Doctor
                    && reg.symptoms.as_slice() == ["Diabetes", "Asthma"]
                    && reg.credentials.email().as_str() == "ada@example.com"
            })
            .returning(|reg| {
                Ok(AuthSession {
                    profile: profile(UserId::random(), reg.symptoms),
                    token: "signed".to_owned(),
                })
            });
        let app = app!(ports);

        let request = actix_test::TestRequest::post()
            .uri("/register")
            .set_json(json!({
                "name": "Ada",
                "email": "Ada@Example.com",
                "password": "pw",
                "role": "doctor",
                "symptoms": "Diabetes, Asthma, ,Diabetes"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value["success"], true);
        assert_eq!(value["token"], "signed");
        assert_eq!(value["data"]["symptoms"], json!(["Diabetes", "Asthma"]));
        assert!(value["data"].get("passwordHash").is_none());
    }

    #[actix_web::test]
    async fn login_surfaces_unauthorized() {
        let mut ports = TestPorts::default();
        ports
            .accounts
            .expect_login()
            .returning(|_| Err(Error::unauthorized("invalid credentials")));
        let app = app!(ports);

        let request = actix_test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "ada@example.com", "password": "nope" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn malformed_json_is_invalid_request() {
        let app = app!(TestPorts::default());
        let request = actix_test::TestRequest::post()
            .uri("/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn me_requires_a_token() {
        let app = app!(TestPorts::default().accepting_test_tokens());
        let request = actix_test::TestRequest::get().uri("/me").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn update_symptoms_uses_caller_identity() {
        let caller = UserId::random();
        let mut ports = TestPorts::default().accepting_test_tokens();
        ports
            .accounts
            .expect_update_symptoms()
            .withf(move |id, tags| *id == caller && tags.as_slice() == ["Asthma"])
            .returning(|id, tags| Ok(profile(id, tags)));
        let app = app!(ports);

        let request = actix_test::TestRequest::patch()
            .uri("/me/symptoms")
            .insert_header(("Authorization", bearer(&test_token(caller, Role::Doctor))))
            .set_json(json!({ "symptoms": ["Asthma"] }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value, json!({ "success": true, "data": { "symptoms": ["Asthma"] } }));
    }
}
