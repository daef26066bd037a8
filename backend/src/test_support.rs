//! Shared helpers for unit tests.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::{EmailAddress, PasswordHash, Role, SymptomTags, User, UserId};

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = TimeDelta::from_std(delta).expect("duration fits in TimeDelta");
        *self.lock() += delta;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().expect("clock mutex")
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

/// Build a user with the given role and symptom tags.
pub fn user(name: &str, role: Role, tags: &[&str]) -> User {
    User {
        id: UserId::random(),
        name: name.to_owned(),
        email: EmailAddress::parse(&format!("{}@example.com", name.replace(' ', ".")))
            .expect("valid email"),
        password_hash: PasswordHash::from_encoded("pbkdf2-sha256$1$00$00"),
        role,
        number: None,
        symptoms: SymptomTags::new(tags.iter().copied()),
        created_at: Utc::now(),
    }
}
