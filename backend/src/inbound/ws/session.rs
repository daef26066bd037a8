//! Per-connection WebSocket handler.
//!
//! Clients join one or more doctor channels, up to
//! [`MAX_CHANNELS_PER_SESSION`]; alerts published to those channels are
//! forwarded as `alert` frames. The public contract pings every
//! 5s and considers a connection idle after 10s without client traffic.
//! Tests shorten these intervals.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use futures_util::stream::{self, BoxStream, SelectAll, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time;
use tracing::{debug, info, warn};

use crate::domain::{Alert, UserId};
use crate::inbound::ws::messages::{ClientEvent, ServerEvent};
use crate::outbound::realtime::AlertHub;

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

/// Distinct doctor channels one connection may join.
pub(crate) const MAX_CHANNELS_PER_SESSION: usize = 16;

pub(super) async fn handle_ws_session(hub: AlertHub, session: Session, stream: MessageStream) {
    WsSession::new(hub).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    TooManyChannels,
    Network(Closed),
}

enum Wake {
    Heartbeat,
    Client(Option<Result<Message, ProtocolError>>),
    Alert(Alert),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

fn alert_stream(receiver: UnboundedReceiver<Alert>) -> BoxStream<'static, Alert> {
    stream::unfold(receiver, |mut receiver| async move {
        receiver.recv().await.map(|alert| (alert, receiver))
    })
    .boxed()
}

struct WsSession {
    hub: AlertHub,
    joined: HashSet<UserId>,
    alerts: SelectAll<BoxStream<'static, Alert>>,
}

impl WsSession {
    fn new(hub: AlertHub) -> Self {
        Self {
            hub,
            joined: HashSet::new(),
            alerts: SelectAll::new(),
        }
    }

    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let wake = tokio::select! {
                _ = heartbeat.tick() => Wake::Heartbeat,
                message = stream.recv() => Wake::Client(message),
                Some(alert) = self.alerts.next(), if !self.alerts.is_empty() => Wake::Alert(alert),
            };

            let result = match wake {
                Wake::Heartbeat => Self::handle_heartbeat_tick(&mut session, &last_heartbeat).await,
                Wake::Client(message) => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                Wake::Alert(alert) => {
                    Self::send_event(&mut session, &ServerEvent::Alert(Box::new(alert)))
                        .await
                        .map_err(SessionError::Network)
                }
            };

            if let Err(error) = result {
                Self::log_shutdown_reason(&error);
                self.leave_all();
                let close_action = Self::close_action_for(&error);
                Self::close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &mut self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let event = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => event,
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                return Err(SessionError::InvalidPayload);
            }
        };

        match event {
            ClientEvent::Join(request) => {
                self.join(request.doctor_id)?;
                Self::send_event(session, &ServerEvent::Joined(request))
                    .await
                    .map_err(SessionError::Network)
            }
        }
    }

    fn join(&mut self, doctor_id: UserId) -> Result<(), SessionError> {
        if self.joined.contains(&doctor_id) {
            debug!(doctor_id = %doctor_id, "WebSocket already joined doctor channel");
            return Ok(());
        }
        if self.joined.len() >= MAX_CHANNELS_PER_SESSION {
            return Err(SessionError::TooManyChannels);
        }
        self.joined.insert(doctor_id);
        self.alerts.push(alert_stream(self.hub.subscribe(doctor_id)));
        info!(doctor_id = %doctor_id, "WebSocket joined doctor channel");
        Ok(())
    }

    /// Release every channel receiver and sweep them from the hub.
    fn leave_all(&mut self) {
        self.alerts = SelectAll::new();
        self.joined.clear();
        self.hub.prune();
    }

    async fn send_event(session: &mut Session, event: &ServerEvent) -> Result<(), Closed> {
        match serde_json::to_string(event) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                warn!(error = %error, "Failed to serialize WebSocket payload");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::TooManyChannels => {
                warn!(limit = MAX_CHANNELS_PER_SESSION, "WebSocket joined too many channels");
            }
            SessionError::InvalidPayload
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::TooManyChannels => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("too many channels".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
