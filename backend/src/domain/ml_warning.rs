//! Rate limiting for repeated predictor-outage warnings.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::warn;

/// Emits a `warn` event at most once per cooldown window.
pub struct RateLimitedWarner {
    cooldown: TimeDelta,
    clock: Arc<dyn Clock>,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl RateLimitedWarner {
    pub fn new(cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cooldown: TimeDelta::from_std(cooldown).unwrap_or(TimeDelta::MAX),
            clock,
            last: Mutex::new(None),
        }
    }

    /// Log `message` unless a warning was emitted within the cooldown.
    ///
    /// Returns whether the event was emitted.
    pub fn warn(&self, message: &str) -> bool {
        let now = self.clock.utc();
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let due = last.is_none_or(|at| now.signed_duration_since(at) > self.cooldown);
        if due {
            warn!(target: "vitalwatch::ml", "{message}");
            *last = Some(now);
        }
        due
    }
}
