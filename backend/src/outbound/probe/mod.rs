//! TCP reachability probe for the predictor.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::ports::{ProbeTarget, ReachabilityProbe};

/// Default connect budget for a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Attempt a TCP connection to `host:port`, returning whether it succeeded
/// within `budget`. Errors and timeouts read as unreachable.
pub async fn is_reachable(host: &str, port: u16, budget: Duration) -> bool {
    match timeout(budget, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(err)) => {
            debug!(host, port, error = %err, "probe connection failed");
            false
        }
        Err(_) => {
            debug!(host, port, ?budget, "probe timed out");
            false
        }
    }
}

/// [`ReachabilityProbe`] that opens and immediately drops a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpReachabilityProbe {
    target: ProbeTarget,
    budget: Duration,
}

impl TcpReachabilityProbe {
    pub fn new(host: impl Into<String>, port: u16, budget: Duration) -> Self {
        Self {
            target: ProbeTarget {
                host: host.into(),
                port,
            },
            budget,
        }
    }
}

#[async_trait]
impl ReachabilityProbe for TcpReachabilityProbe {
    async fn is_reachable(&self) -> bool {
        is_reachable(&self.target.host, self.target.port, self.budget).await
    }

    fn target(&self) -> ProbeTarget {
        self.target.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let probe = TcpReachabilityProbe::new("127.0.0.1", port, Duration::from_secs(1));
        assert!(probe.is_reachable().await);
        assert_eq!(probe.target().to_string(), format!("127.0.0.1:{port}"));
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            listener.local_addr().expect("addr").port()
        };
        assert!(!is_reachable("127.0.0.1", port, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn unresolvable_host_is_unreachable() {
        assert!(!is_reachable("host.invalid", 80, Duration::from_millis(500)).await);
    }
}
