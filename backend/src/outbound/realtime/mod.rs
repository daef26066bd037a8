//! In-process fan-out of alerts to live doctor sessions.
//!
//! Each WebSocket session that joins as a doctor registers an unbounded
//! channel under that doctor's id. Publishing clones the alert into every
//! open channel for the owner. Channels whose receiver has gone are pruned
//! on publish, on every new subscription, and when a session ends.
//!
//! Alerts for one doctor are delivered in publish order on each channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use crate::domain::ports::{AlertPublishError, AlertPublisher};
use crate::domain::{Alert, UserId};

type Channels = HashMap<UserId, Vec<UnboundedSender<Alert>>>;

/// Per-doctor alert channels shared by the HTTP and WebSocket adapters.
#[derive(Clone, Default)]
pub struct AlertHub {
    channels: Arc<Mutex<Channels>>,
}

impl AlertHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Channels> {
        self.channels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Join `doctor`'s channel. Dropping the receiver leaves it.
    pub fn subscribe(&self, doctor: UserId) -> UnboundedReceiver<Alert> {
        let (tx, rx) = unbounded_channel();
        let mut channels = self.lock();
        sweep(&mut channels);
        channels.entry(doctor).or_default().push(tx);
        debug!(doctor_id = %doctor, "session joined alert channel");
        rx
    }

    /// Drop every channel whose receiver has gone.
    pub fn prune(&self) {
        sweep(&mut self.lock());
    }

    /// Doctors with at least one registered channel.
    pub fn channel_count(&self) -> usize {
        self.lock().len()
    }

    /// Live sessions for `doctor`.
    pub fn subscriber_count(&self, doctor: &UserId) -> usize {
        self.lock()
            .get(doctor)
            .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
    }
}

fn sweep(channels: &mut Channels) {
    channels.retain(|_, senders| {
        senders.retain(|tx| !tx.is_closed());
        !senders.is_empty()
    });
}

impl AlertPublisher for AlertHub {
    fn publish(&self, alert: &Alert) -> Result<usize, AlertPublishError> {
        let mut channels = self.lock();
        let Some(senders) = channels.get_mut(&alert.doctor_id) else {
            return Ok(0);
        };
        senders.retain(|tx| tx.send(alert.clone()).is_ok());
        let delivered = senders.len();
        if senders.is_empty() {
            channels.remove(&alert.doctor_id);
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewAlert, PatientSnapshot, RiskFlag, SymptomTags};
    use chrono::Utc;
    use serde_json::json;

    fn alert_for(doctor_id: UserId) -> Alert {
        Alert::from_new(
            NewAlert {
                patient_id: None,
                doctor_id,
                measurement_id: None,
                prediction: RiskFlag::High,
                ml_body: json!({ "prediction": 1 }),
                patient_snapshot: PatientSnapshot::default(),
                message: "Patient unknown high-risk detected".to_owned(),
                symptoms: SymptomTags::new(["Asthma"]),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn delivers_only_to_the_owning_doctor() {
        let hub = AlertHub::new();
        let owner = UserId::random();
        let other = UserId::random();
        let mut owner_rx = hub.subscribe(owner);
        let mut other_rx = hub.subscribe(other);

        let alert = alert_for(owner);
        assert_eq!(hub.publish(&alert), Ok(1));
        assert_eq!(owner_rx.recv().await.map(|a| a.id), Some(alert.id));
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn fans_out_to_every_session_of_a_doctor() {
        let hub = AlertHub::new();
        let doctor = UserId::random();
        let mut first = hub.subscribe(doctor);
        let mut second = hub.subscribe(doctor);

        assert_eq!(hub.publish(&alert_for(doctor)), Ok(2));
        assert!(first.recv().await.is_some());
        assert!(second.recv().await.is_some());
    }

    #[test]
    fn prunes_dropped_sessions() {
        let hub = AlertHub::new();
        let doctor = UserId::random();
        let rx = hub.subscribe(doctor);
        assert_eq!(hub.subscriber_count(&doctor), 1);
        drop(rx);

        assert_eq!(hub.publish(&alert_for(doctor)), Ok(0));
        assert_eq!(hub.subscriber_count(&doctor), 0);
    }

    #[test]
    fn subscribing_sweeps_abandoned_channels_without_a_publish() {
        let hub = AlertHub::new();
        for _ in 0..3 {
            drop(hub.subscribe(UserId::random()));
        }
        assert_eq!(hub.channel_count(), 3);

        let _live = hub.subscribe(UserId::random());
        assert_eq!(hub.channel_count(), 1);
    }

    #[test]
    fn prune_empties_the_map_once_sessions_leave() {
        let hub = AlertHub::new();
        let doctor = UserId::random();
        let first = hub.subscribe(doctor);
        let second = hub.subscribe(doctor);
        drop(first);
        hub.prune();
        assert_eq!(hub.subscriber_count(&doctor), 1);

        drop(second);
        hub.prune();
        assert_eq!(hub.channel_count(), 0);
    }

    #[tokio::test]
    async fn alerts_for_one_doctor_arrive_in_publish_order() {
        let hub = AlertHub::new();
        let doctor = UserId::random();
        let mut rx = hub.subscribe(doctor);
        let alerts: Vec<Alert> = (0..5).map(|_| alert_for(doctor)).collect();
        for alert in &alerts {
            assert_eq!(hub.publish(alert), Ok(1));
        }

        let mut received = Vec::new();
        for _ in 0..alerts.len() {
            received.push(rx.recv().await.map(|a| a.id));
        }
        let expected: Vec<_> = alerts.iter().map(|a| Some(a.id)).collect();
        assert_eq!(received, expected);
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        assert_eq!(AlertHub::new().publish(&alert_for(UserId::random())), Ok(0));
    }
}
