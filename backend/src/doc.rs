//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler from the inbound layer, the
//! domain types they exchange, and the bearer-token security scheme. The
//! document is served by Swagger UI in debug builds and printed by the
//! `openapi-dump` binary.

use crate::domain::ports::{StoreBackend, StoreStatusReport};
use crate::domain::{
    Alert, AlertView, Error, ErrorCode, FeatureVector, HypertensionQuestionnaire, Measurement,
    PartialVitals, PatientSnapshot, PatientSummary, RecordReceipt, RiskFlag, Role, UserProfile,
    VitalSigns,
};
use crate::inbound::http::accounts::{
    LoginRequest, RegisterRequest, SessionResponse, SymptomsData, SymptomsInput, SymptomsRequest,
};
use crate::inbound::http::alerts::AlertListQuery;
use crate::inbound::http::measurements::{HypertensionRequest, MeasurementRequest};
use crate::inbound::http::predictions::PredictionResponse;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("HMAC-signed claims")
                    .description(Some("Token returned by POST /register or POST /login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "VitalWatch API",
        description = "Vital-sign capture, risk prediction, and doctor alerting.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::me,
        crate::inbound::http::accounts::update_symptoms,
        crate::inbound::http::measurements::create_measurement,
        crate::inbound::http::measurements::create_hypertension,
        crate::inbound::http::predictions::predict,
        crate::inbound::http::predictions::predict_heart_from_form,
        crate::inbound::http::alerts::list_alerts,
        crate::inbound::http::alerts::get_alert,
        crate::inbound::http::alerts::mark_read,
        crate::inbound::http::alerts::mark_unread,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ml_health,
        crate::inbound::http::health::db_status,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Alert,
        AlertView,
        PatientSnapshot,
        PatientSummary,
        Measurement,
        RecordReceipt,
        VitalSigns,
        PartialVitals,
        FeatureVector,
        RiskFlag,
        Role,
        UserProfile,
        HypertensionQuestionnaire,
        StoreStatusReport,
        StoreBackend,
        RegisterRequest,
        LoginRequest,
        SymptomsInput,
        SymptomsRequest,
        SymptomsData,
        SessionResponse,
        MeasurementRequest,
        HypertensionRequest,
        PredictionResponse,
        AlertListQuery,
    )),
    tags(
        (name = "accounts", description = "Registration, login, and profile"),
        (name = "measurements", description = "Direct vital-sign submissions"),
        (name = "predictions", description = "Risk prediction and alerting"),
        (name = "alerts", description = "Doctor alert inbox"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("Alert", "doctorId")]
    #[case("Alert", "read")]
    #[case("UserProfile", "symptoms")]
    #[case("RecordReceipt", "createdAt")]
    fn schemas_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas
            .get(schema)
            .unwrap_or_else(|| panic!("{schema} schema registered"));
        assert_object_schema_has_field(found, field);
    }

    #[rstest]
    #[case("/register")]
    #[case("/api/predict")]
    #[case("/api/alerts/{id}/read")]
    #[case("/api/dbstatus")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
