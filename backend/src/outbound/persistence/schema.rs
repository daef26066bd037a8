//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. When a migration
//! changes the schema, regenerate with `diesel print-schema` or edit by hand.

diesel::table! {
    /// Patient, doctor, and admin accounts.
    users (id) {
        id -> Uuid,
        name -> Text,
        /// Lower-cased, unique.
        email -> Text,
        password_hash -> Text,
        /// `patient`, `doctor`, or `admin`.
        role -> Text,
        number -> Nullable<Text>,
        /// Conditions for patients, specialties for doctors.
        symptoms -> Array<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Raw vital-sign submissions.
    measurements (id) {
        id -> Uuid,
        patient_id -> Nullable<Uuid>,
        systolic -> Float8,
        diastolic -> Float8,
        heart_rate -> Float8,
        glucose_level -> Float8,
        temperature -> Float8,
        oxygen_saturation -> Float8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Audit trail of every risk assessment.
    predictions (id) {
        id -> Uuid,
        patient_id -> Nullable<Uuid>,
        measurement_id -> Nullable<Uuid>,
        model -> Text,
        /// 0 or 1.
        prediction -> Int2,
        /// Feature vector with `null` holes.
        features -> Jsonb,
        ml_body -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Doctor-scoped high-risk notifications.
    alerts (id) {
        id -> Uuid,
        patient_id -> Nullable<Uuid>,
        doctor_id -> Uuid,
        measurement_id -> Nullable<Uuid>,
        prediction -> Int2,
        ml_body -> Jsonb,
        patient_snapshot -> Jsonb,
        message -> Text,
        symptoms -> Array<Text>,
        read -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Hypertension questionnaire submissions.
    hypertension_records (id) {
        id -> Uuid,
        patient_id -> Nullable<Uuid>,
        systolic -> Float8,
        diastolic -> Float8,
        heart_rate -> Float8,
        glucose_level -> Float8,
        temperature -> Float8,
        oxygen_saturation -> Float8,
        age -> Nullable<Float8>,
        salt_intake -> Nullable<Float8>,
        stress_score -> Nullable<Float8>,
        bp_history -> Nullable<Text>,
        sleep_duration -> Nullable<Float8>,
        bmi -> Nullable<Float8>,
        medication -> Nullable<Text>,
        family_history -> Nullable<Text>,
        exercise_level -> Nullable<Text>,
        smoking_status -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(alerts -> users (doctor_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    measurements,
    predictions,
    alerts,
    hypertension_records,
);
