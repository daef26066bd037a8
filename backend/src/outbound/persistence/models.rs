//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer; repositories convert them
//! to domain types at the boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{alerts, hypertension_records, measurements, predictions, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub number: Option<String>,
    pub symptoms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub number: Option<&'a str>,
    pub symptoms: &'a [String],
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = measurements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MeasurementRow {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub glucose_level: f64,
    pub temperature: f64,
    pub oxygen_saturation: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = measurements)]
pub(crate) struct NewMeasurementRow {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub glucose_level: f64,
    pub temperature: f64,
    pub oxygen_saturation: f64,
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = predictions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PredictionRow {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub measurement_id: Option<Uuid>,
    pub model: String,
    pub prediction: i16,
    pub features: Value,
    pub ml_body: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = predictions)]
pub(crate) struct NewPredictionRow<'a> {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub measurement_id: Option<Uuid>,
    pub model: &'a str,
    pub prediction: i16,
    pub features: Value,
    pub ml_body: &'a Value,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = alerts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AlertRow {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub doctor_id: Uuid,
    pub measurement_id: Option<Uuid>,
    pub prediction: i16,
    pub ml_body: Value,
    pub patient_snapshot: Value,
    pub message: String,
    pub symptoms: Vec<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = alerts)]
pub(crate) struct NewAlertRow<'a> {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub doctor_id: Uuid,
    pub measurement_id: Option<Uuid>,
    pub prediction: i16,
    pub ml_body: &'a Value,
    pub patient_snapshot: Value,
    pub message: &'a str,
    pub symptoms: &'a [String],
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Hypertension records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = hypertension_records)]
pub(crate) struct NewHypertensionRow<'a> {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub glucose_level: f64,
    pub temperature: f64,
    pub oxygen_saturation: f64,
    pub age: Option<f64>,
    pub salt_intake: Option<f64>,
    pub stress_score: Option<f64>,
    pub bp_history: Option<&'a str>,
    pub sleep_duration: Option<f64>,
    pub bmi: Option<f64>,
    pub medication: Option<&'a str>,
    pub family_history: Option<&'a str>,
    pub exercise_level: Option<&'a str>,
    pub smoking_status: Option<&'a str>,
}
