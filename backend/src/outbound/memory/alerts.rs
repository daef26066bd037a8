//! Alert store with doctor-scoped reads.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::recover;
use crate::domain::ports::{AlertRepository, AlertRepositoryError};
use crate::domain::{Alert, AlertFilter, AlertId, MeasurementId, NewAlert, UserId};

#[derive(Debug, Default)]
pub struct InMemoryAlertRepository {
    rows: RwLock<Vec<Alert>>,
}

impl InMemoryAlertRepository {
    /// Every stored alert in insertion order, across doctors.
    pub fn all(&self) -> Vec<Alert> {
        recover(self.rows.read()).clone()
    }
}

#[async_trait]
impl AlertRepository for InMemoryAlertRepository {
    async fn insert_batch(&self, alerts: &[NewAlert]) -> Result<Vec<Alert>, AlertRepositoryError> {
        let now = Utc::now();
        let created: Vec<Alert> = alerts
            .iter()
            .cloned()
            .map(|new| Alert::from_new(new, now))
            .collect();
        recover(self.rows.write()).extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &UserId,
        filter: AlertFilter,
    ) -> Result<Vec<Alert>, AlertRepositoryError> {
        let rows = recover(self.rows.read());
        let mut found: Vec<Alert> = rows
            .iter()
            .rev()
            .filter(|a| a.doctor_id == *doctor_id)
            .filter(|a| !filter.risk_only || a.prediction.is_high())
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_for_doctor(
        &self,
        doctor_id: &UserId,
        alert_id: &AlertId,
    ) -> Result<Option<Alert>, AlertRepositoryError> {
        Ok(recover(self.rows.read())
            .iter()
            .find(|a| a.id == *alert_id && a.doctor_id == *doctor_id)
            .cloned())
    }

    async fn set_read(
        &self,
        doctor_id: &UserId,
        alert_id: &AlertId,
        read: bool,
    ) -> Result<Option<Alert>, AlertRepositoryError> {
        let mut rows = recover(self.rows.write());
        Ok(rows
            .iter_mut()
            .find(|a| a.id == *alert_id && a.doctor_id == *doctor_id)
            .map(|alert| {
                if alert.read != read {
                    alert.read = read;
                    alert.updated_at = Utc::now();
                }
                alert.clone()
            }))
    }

    async fn list_by_measurement(
        &self,
        measurement_id: &MeasurementId,
    ) -> Result<Vec<Alert>, AlertRepositoryError> {
        Ok(recover(self.rows.read())
            .iter()
            .filter(|a| a.measurement_id == Some(*measurement_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PatientSnapshot, RiskFlag, SymptomTags};
    use serde_json::json;
    use uuid::Uuid;

    fn new_alert(doctor_id: UserId, prediction: RiskFlag) -> NewAlert {
        NewAlert {
            patient_id: None,
            doctor_id,
            measurement_id: None,
            prediction,
            ml_body: json!({}),
            patient_snapshot: PatientSnapshot::default(),
            message: "m".to_owned(),
            symptoms: SymptomTags::default(),
        }
    }

    #[tokio::test]
    async fn doctors_only_see_their_own_alerts_newest_first() {
        let repo = InMemoryAlertRepository::default();
        let mine = UserId::random();
        let theirs = UserId::random();
        let first = repo
            .insert_batch(&[new_alert(mine, RiskFlag::High), new_alert(theirs, RiskFlag::High)])
            .await
            .expect("insert");
        let second = repo
            .insert_batch(&[new_alert(mine, RiskFlag::Low)])
            .await
            .expect("insert");

        let listed = repo
            .list_for_doctor(&mine, AlertFilter::default())
            .await
            .expect("list");
        assert_eq!(
            listed.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![second[0].id, first[0].id]
        );
        let risky = repo
            .list_for_doctor(&mine, AlertFilter { risk_only: true })
            .await
            .expect("list");
        assert_eq!(risky.len(), 1);
        assert!(
            repo.find_for_doctor(&mine, &first[1].id)
                .await
                .expect("find")
                .is_none()
        );
    }

    #[tokio::test]
    async fn set_read_only_touches_owned_alerts() {
        let repo = InMemoryAlertRepository::default();
        let doctor = UserId::random();
        let created = repo
            .insert_batch(&[new_alert(doctor, RiskFlag::High)])
            .await
            .expect("insert");
        let id = created[0].id;

        assert!(
            repo.set_read(&UserId::random(), &id, true)
                .await
                .expect("update")
                .is_none()
        );
        let updated = repo
            .set_read(&doctor, &id, true)
            .await
            .expect("update")
            .expect("owned");
        assert!(updated.read);
        assert!(
            repo.set_read(&doctor, &AlertId(Uuid::new_v4()), true)
                .await
                .expect("update")
                .is_none()
        );
    }
}
