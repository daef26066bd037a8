//! Port for the cheap pre-flight check of the predictor.

use std::fmt;

use async_trait::async_trait;

/// Host and port being probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Answers whether the predictor currently accepts connections.
///
/// Implementations never fail: errors and timeouts read as unreachable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn is_reachable(&self) -> bool;

    fn target(&self) -> ProbeTarget;
}
