//! Tests for alert dispatch and the doctor inbox.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    AlertPublishError, MockAlertPublisher, MockAlertRepository, MockMeasurementRepository,
    MockUserRepository,
};
use crate::domain::{ErrorCode, PatientSnapshot, Role};
use crate::test_support::user;

fn draft(patient: &User) -> AlertDraft {
    AlertDraft {
        subject: AlertSubject {
            patient_id: Some(patient.id),
            snapshot: PatientSnapshot::from(patient),
        },
        measurement_id: Some(MeasurementId(Uuid::new_v4())),
        prediction: RiskFlag::High,
        ml_body: json!({ "prediction": 1 }),
        symptoms: SymptomTags::new(["Diabetes"]),
    }
}

fn stored(new: &NewAlert) -> Alert {
    Alert::from_new(new.clone(), Utc::now())
}

fn stored_alert(doctor_id: UserId, read: bool) -> Alert {
    let mut alert = Alert::from_new(
        NewAlert {
            patient_id: None,
            doctor_id,
            measurement_id: None,
            prediction: RiskFlag::High,
            ml_body: json!({}),
            patient_snapshot: PatientSnapshot::default(),
            message: "m".to_owned(),
            symptoms: SymptomTags::default(),
        },
        Utc::now(),
    );
    alert.read = read;
    alert
}

#[tokio::test]
async fn dispatch_writes_one_batch_and_publishes_each_alert() {
    let patient = user("pat", Role::Patient, &["Diabetes"]);
    let doctors = vec![
        user("endo one", Role::Doctor, &["Diabetes"]),
        user("endo two", Role::Doctor, &["Diabetes", "Asthma"]),
    ];

    let mut repo = MockAlertRepository::new();
    repo.expect_insert_batch()
        .times(1)
        .withf(|batch| batch.len() == 2 && batch.iter().all(|a| a.prediction == RiskFlag::High))
        .returning(|batch| Ok(batch.iter().map(stored).collect()));

    let published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    let mut publisher = MockAlertPublisher::new();
    publisher.expect_publish().times(2).returning(move |alert| {
        sink.lock().expect("lock").push(alert.doctor_id);
        Ok(1)
    });

    let dispatcher = AlertDispatcher::new(Arc::new(repo), Arc::new(publisher));
    let created = dispatcher.dispatch(&draft(&patient), &doctors).await;

    assert_eq!(created.len(), 2);
    assert_eq!(
        created[0].message,
        "Patient pat high-risk detected — symptoms: Diabetes"
    );
    assert_eq!(
        *published.lock().expect("lock"),
        vec![doctors[0].id, doctors[1].id]
    );
}

#[tokio::test]
async fn dispatch_swallows_publish_failures() {
    let patient = user("pat", Role::Patient, &["Diabetes"]);
    let doctors = vec![user("endo", Role::Doctor, &["Diabetes"])];

    let mut repo = MockAlertRepository::new();
    repo.expect_insert_batch()
        .returning(|batch| Ok(batch.iter().map(stored).collect()));
    let mut publisher = MockAlertPublisher::new();
    publisher
        .expect_publish()
        .returning(|_| Err(AlertPublishError::delivery("no subscribers")));

    let dispatcher = AlertDispatcher::new(Arc::new(repo), Arc::new(publisher));
    let created = dispatcher.dispatch(&draft(&patient), &doctors).await;
    assert_eq!(created.len(), 1);
}

#[tokio::test]
async fn dispatch_swallows_persistence_failures_without_publishing() {
    let patient = user("pat", Role::Patient, &["Diabetes"]);
    let doctors = vec![user("endo", Role::Doctor, &["Diabetes"])];

    let mut repo = MockAlertRepository::new();
    repo.expect_insert_batch()
        .returning(|_| Err(AlertRepositoryError::connection("down")));
    let mut publisher = MockAlertPublisher::new();
    publisher.expect_publish().times(0);

    let dispatcher = AlertDispatcher::new(Arc::new(repo), Arc::new(publisher));
    assert!(dispatcher.dispatch(&draft(&patient), &doctors).await.is_empty());
}

#[tokio::test]
async fn dispatch_without_doctors_touches_nothing() {
    let patient = user("pat", Role::Patient, &["Diabetes"]);
    let mut repo = MockAlertRepository::new();
    repo.expect_insert_batch().times(0);
    let dispatcher = AlertDispatcher::new(Arc::new(repo), Arc::new(MockAlertPublisher::new()));
    assert!(dispatcher.dispatch(&draft(&patient), &[]).await.is_empty());
}

fn inbox(alerts: MockAlertRepository) -> AlertInboxService {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));
    let mut measurements = MockMeasurementRepository::new();
    measurements.expect_find_by_id().returning(|_| Ok(None));
    AlertInboxService::new(Arc::new(alerts), Arc::new(users), Arc::new(measurements))
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn read_state_changes_are_idempotent(#[case] read: bool) {
    let doctor = UserId::random();
    let existing = stored_alert(doctor, read);
    let alert_id = existing.id;

    let mut repo = MockAlertRepository::new();
    repo.expect_find_for_doctor()
        .with(eq(doctor), eq(alert_id))
        .returning(move |_, _| Ok(Some(existing.clone())));
    repo.expect_set_read().times(0);

    let service = inbox(repo);
    let alert = if read {
        service.mark_read(doctor, alert_id).await
    } else {
        service.mark_unread(doctor, alert_id).await
    }
    .expect("idempotent update succeeds");
    assert_eq!(alert.read, read);
}

#[tokio::test]
async fn mark_read_flips_unread_alert() {
    let doctor = UserId::random();
    let existing = stored_alert(doctor, false);
    let alert_id = existing.id;
    let mut updated = existing.clone();
    updated.read = true;

    let mut repo = MockAlertRepository::new();
    repo.expect_find_for_doctor()
        .returning(move |_, _| Ok(Some(existing.clone())));
    repo.expect_set_read()
        .with(eq(doctor), eq(alert_id), eq(true))
        .times(1)
        .returning(move |_, _, _| Ok(Some(updated.clone())));

    let alert = inbox(repo)
        .mark_read(doctor, alert_id)
        .await
        .expect("mark read");
    assert!(alert.read);
}

#[tokio::test]
async fn foreign_or_missing_alerts_are_not_found() {
    let mut repo = MockAlertRepository::new();
    repo.expect_find_for_doctor().returning(|_, _| Ok(None));
    let service = inbox(repo);
    let doctor = UserId::random();
    let alert_id = AlertId(Uuid::new_v4());

    let get = service.get(doctor, alert_id).await.expect_err("not found");
    assert_eq!(get.code(), ErrorCode::NotFound);
    let read = service.mark_read(doctor, alert_id).await.expect_err("not found");
    assert_eq!(read.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn list_resolves_patient_once_per_id() {
    let doctor = UserId::random();
    let patient = user("pat", Role::Patient, &["Asthma"]);
    let patient_id = patient.id;
    let mut first = stored_alert(doctor, false);
    first.patient_id = Some(patient_id);
    let mut second = stored_alert(doctor, true);
    second.patient_id = Some(patient_id);

    let mut repo = MockAlertRepository::new();
    repo.expect_list_for_doctor()
        .with(eq(doctor), eq(AlertFilter { risk_only: true }))
        .returning(move |_, _| Ok(vec![first.clone(), second.clone()]));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(patient.clone())));
    let measurements = MockMeasurementRepository::new();

    let service =
        AlertInboxService::new(Arc::new(repo), Arc::new(users), Arc::new(measurements));
    let views = service
        .list(doctor, AlertFilter { risk_only: true })
        .await
        .expect("list");
    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|v| v.patient.as_ref().map(|p| p.id) == Some(patient_id)));
}

#[tokio::test]
async fn list_maps_connection_errors_to_service_unavailable() {
    let mut repo = MockAlertRepository::new();
    repo.expect_list_for_doctor()
        .returning(|_, _| Err(AlertRepositoryError::connection("refused")));
    let error = inbox(repo)
        .list(UserId::random(), AlertFilter::default())
        .await
        .expect_err("store down");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
