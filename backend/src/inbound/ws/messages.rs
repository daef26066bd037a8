//! WebSocket frame payloads.
//!
//! Frames are `{"event": <name>, "data": <payload>}` objects in both
//! directions.

use serde::{Deserialize, Serialize};

use crate::domain::{Alert, UserId};

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ClientEvent {
    /// Subscribe this connection to a doctor's alert channel.
    Join(JoinRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub doctor_id: UserId,
}

/// Events the server pushes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum ServerEvent {
    Joined(JoinRequest),
    Alert(Box<Alert>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn join_frame_parses() {
        let id = UserId::random();
        let event: ClientEvent =
            serde_json::from_value(json!({ "event": "join", "data": { "doctorId": id } }))
                .expect("join frame");
        assert_eq!(event, ClientEvent::Join(JoinRequest { doctor_id: id }));
    }

    #[test]
    fn unknown_events_are_rejected() {
        let result = serde_json::from_value::<ClientEvent>(json!({ "event": "leave", "data": {} }));
        assert!(result.is_err());
    }

    #[test]
    fn joined_ack_shape() {
        let id = UserId::random();
        let value =
            serde_json::to_value(ServerEvent::Joined(JoinRequest { doctor_id: id })).expect("json");
        assert_eq!(value, json!({ "event": "joined", "data": { "doctorId": id.to_string() } }));
        assert!(matches!(value["data"], Value::Object(_)));
    }
}
