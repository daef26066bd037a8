//! Shared WebSocket adapter state.

use std::sync::Arc;

use url::{Origin, Url};

use crate::outbound::realtime::AlertHub;

/// Dependency bundle for the `/ws` entry point and its sessions.
#[derive(Clone)]
pub struct WsState {
    pub hub: AlertHub,
    allowed_origins: Arc<[Origin]>,
}

impl WsState {
    /// Construct state from the hub and the Origin allow-list.
    pub fn new(hub: AlertHub, allowed_origins: &[Url]) -> Self {
        Self {
            hub,
            allowed_origins: allowed_origins.iter().map(Url::origin).collect(),
        }
    }

    /// True when `origin` matches an allow-listed scheme, host, and port.
    pub fn allows(&self, origin: &Url) -> bool {
        let origin = origin.origin();
        origin.is_tuple() && self.allowed_origins.contains(&origin)
    }
}
